//! Signed editor tokens
//!
//! Unlocking a group with its PIN yields a bearer token that grants edit
//! access to that group until it expires. Format:
//! `base64url(json payload).hex(hmac_sha256(secret, base64url payload))`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::domain::entities::GroupId;

type HmacSha256 = Hmac<Sha256>;

const EDITOR_ROLE: &str = "editor";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("bad token signature")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    group_id: GroupId,
    role: String,
    /// Expiry as unix seconds
    exp: i64,
}

/// A freshly issued editor token
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and verifies editor tokens with a shared secret
#[derive(Clone)]
pub struct EditorTokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl EditorTokenSigner {
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    fn mac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::BadSignature)
    }

    pub fn issue(&self, group_id: GroupId, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            group_id,
            role: EDITOR_ROLE.to_string(),
            exp: expires_at.timestamp(),
        };
        let payload = serde_json::to_vec(&claims).map_err(|_| TokenError::Malformed)?;
        let encoded = URL_SAFE_NO_PAD.encode(payload);

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        Ok(IssuedToken {
            token: format!("{}.{}", encoded, signature),
            expires_at,
        })
    }

    /// Group the token grants edit access to
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<GroupId, TokenError> {
        let (encoded, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = hex::decode(signature).map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(encoded.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(encoded)
            .map_err(|_| TokenError::Malformed)?;
        let claims: Claims = serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if claims.role != EDITOR_ROLE {
            return Err(TokenError::Malformed);
        }
        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims.group_id)
    }
}
