//! Editor authentication
//!
//! Groups are public to read. Editing requires unlocking the group with its
//! PIN, which issues a signed, expiring editor token.

pub mod editor;
pub mod editor_token;
pub mod pin;

pub use editor::Editor;
pub use editor_token::{EditorTokenSigner, IssuedToken, TokenError};
pub use pin::{hash_pin, verify_pin};
