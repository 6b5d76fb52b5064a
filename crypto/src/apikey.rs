//! Bearer API keys for platform identities.
//!
//! Keys are shown to the caller once at registration; only their SHA-256 hex
//! digest is stored.

use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;

/// Prefix of every issued key.
pub const API_KEY_PREFIX: &str = "sb_";

const API_KEY_RANDOM_CHARS: usize = 48;

/// Generate a new API key: `sb_` followed by 48 random alphanumerics.
pub fn generate_api_key() -> String {
    let random: String = OsRng
        .sample_iter(&Alphanumeric)
        .take(API_KEY_RANDOM_CHARS)
        .map(char::from)
        .collect();
    format!("{API_KEY_PREFIX}{random}")
}

/// Storage form of an API key.
pub fn hash_api_key(key: &str) -> String {
    crate::sha256_hex(key.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_have_expected_shape() {
        let key = generate_api_key();
        assert!(key.starts_with(API_KEY_PREFIX));
        assert_eq!(key.len(), API_KEY_PREFIX.len() + API_KEY_RANDOM_CHARS);
        assert!(key[API_KEY_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn hash_is_stable_and_distinct() {
        assert_eq!(hash_api_key("sb_abc"), hash_api_key("sb_abc"));
        assert_ne!(hash_api_key("sb_abc"), hash_api_key("sb_abd"));
        assert_eq!(hash_api_key("sb_abc").len(), 64);
    }
}
