//! API key codec
//!
//! Generates credentials, hashes them for storage and masks them for display.
//! No state beyond configuration and no I/O.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::distributions::Alphanumeric;
use rand::{Rng, RngCore};
use sha2::{Digest, Sha256};

const MASK_CHAR: char = '*';
const VISIBLE_SUFFIX: usize = 4;
const MIN_MASKABLE_LEN: usize = 8;
const SHORT_MASK: &str = "****";

/// Result of generating a new API key
#[derive(Debug, Clone)]
pub struct GeneratedApiKey {
    /// The full credential; shown to the caller once and then dropped
    pub key: String,
    /// The digest to persist
    pub hash: String,
}

/// Codec for API key credentials
#[derive(Debug, Clone)]
pub struct KeyCodec {
    /// Fixed prefix of every credential (e.g. "wc_")
    prefix: String,
    /// Number of random alphanumeric characters after the prefix
    secret_len: usize,
}

impl KeyCodec {
    /// Create a codec with the given prefix and the default secret length
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            secret_len: 32,
        }
    }

    /// Generate a new credential and its digest
    pub fn generate(&self) -> GeneratedApiKey {
        let secret: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.secret_len)
            .map(char::from)
            .collect();

        let key = format!("{}{}", self.prefix, secret);
        let hash = self.hash(&key);

        GeneratedApiKey { key, hash }
    }

    /// Hash a credential for storage
    pub fn hash(&self, key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let result = hasher.finalize();
        format!("sha256${}", URL_SAFE_NO_PAD.encode(result))
    }

    /// Verify a presented credential against a stored digest
    pub fn verify(&self, key: &str, stored_hash: &str) -> bool {
        let computed_hash = self.hash(key);
        constant_time_compare(&computed_hash, stored_hash)
    }

    /// Mask a string for display
    ///
    /// Keeps the credential prefix (when present) and the last four characters;
    /// anything shorter than eight characters becomes `****`.
    pub fn mask(&self, value: &str) -> String {
        let chars: Vec<char> = value.chars().collect();
        if chars.len() < MIN_MASKABLE_LEN {
            return SHORT_MASK.to_string();
        }

        let suffix: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();

        let prefix_len = self.prefix.chars().count();
        if value.starts_with(&self.prefix) && chars.len() >= prefix_len + VISIBLE_SUFFIX {
            let hidden = chars.len() - prefix_len - VISIBLE_SUFFIX;
            return format!(
                "{}{}{}",
                self.prefix,
                MASK_CHAR.to_string().repeat(hidden),
                suffix
            );
        }

        format!("{}{}", SHORT_MASK, suffix)
    }

    /// Display preview derived from a stored digest
    ///
    /// Has the same shape as `mask` applied to a freshly generated credential:
    /// prefix, one mask character per hidden secret character, last four of
    /// the digest.
    pub fn preview_from_hash(&self, hash: &str) -> String {
        let chars: Vec<char> = hash.chars().collect();
        if chars.len() < MIN_MASKABLE_LEN {
            return SHORT_MASK.to_string();
        }

        let suffix: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();
        let hidden = self.secret_len.saturating_sub(VISIBLE_SUFFIX);

        format!(
            "{}{}{}",
            self.prefix,
            MASK_CHAR.to_string().repeat(hidden),
            suffix
        )
    }

    /// Random URL-safe token for one-time links such as email verification
    pub fn random_token(&self) -> String {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}

/// Constant-time string comparison to prevent timing attacks
pub(crate) fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

impl Default for KeyCodec {
    fn default() -> Self {
        Self::new("wc_")
    }
}
