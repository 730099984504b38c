//! Group PIN hashing
//!
//! PINs are stored as `salt$digest`: a random 16-byte salt and the
//! HMAC-SHA256 of the PIN keyed by that salt, both hex encoded.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SALT_LEN: usize = 16;

fn keyed_digest(salt: &[u8], pin: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(salt).ok()?;
    mac.update(pin.as_bytes());
    Some(mac)
}

/// Hash a PIN with a fresh random salt
pub fn hash_pin(pin: &str) -> String {
    let salt: [u8; SALT_LEN] = rand::thread_rng().gen();
    let digest = keyed_digest(&salt, pin)
        .map(|mac| hex::encode(mac.finalize().into_bytes()))
        .unwrap_or_default();
    format!("{}${}", hex::encode(salt), digest)
}

/// Check a PIN against a stored hash in constant time
pub fn verify_pin(pin: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(digest_hex)) else {
        return false;
    };

    keyed_digest(&salt, pin).is_some_and(|mac| mac.verify_slice(&expected).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_pin_verifies() {
        let stored = hash_pin("2468");
        assert!(verify_pin("2468", &stored));
        assert!(!verify_pin("2469", &stored));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_pin("2468");
        let second = hash_pin("2468");

        assert_ne!(first, second);
        assert_eq!(first.split_once('$').unwrap().0.len(), SALT_LEN * 2);
    }

    #[test]
    fn malformed_hashes_never_verify() {
        assert!(!verify_pin("2468", ""));
        assert!(!verify_pin("2468", "no-separator"));
        assert!(!verify_pin("2468", "zz$00"));
        assert!(!verify_pin("2468", "00ff$"));
    }
}
