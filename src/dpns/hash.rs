//! Name normalization and the commit-reveal hash

use crate::crypto::sha256d;

/// Canonical form of a label: ASCII lower-case.
///
/// Labels are restricted to `[a-zA-Z0-9-]` by the schema, so ASCII case
/// folding is the whole normalization.
pub fn normalize_label(label: &str) -> String {
    label.to_ascii_lowercase()
}

/// `label.parent`, or just `label` for a top-level name.
pub fn full_domain_name(normalized_label: &str, normalized_parent_domain_name: &str) -> String {
    if normalized_parent_domain_name.is_empty() {
        normalized_label.to_string()
    } else {
        format!("{}.{}", normalized_label, normalized_parent_domain_name)
    }
}

/// `sha256d(salt || full_domain_name)`
pub fn salted_domain_hash(salt: &[u8], full_domain_name: &str) -> [u8; 32] {
    let mut preimage = Vec::with_capacity(salt.len() + full_domain_name.len());
    preimage.extend_from_slice(salt);
    preimage.extend_from_slice(full_domain_name.as_bytes());
    sha256d(&preimage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_domain_name() {
        assert_eq!(full_domain_name("wallet", "dash"), "wallet.dash");
        assert_eq!(full_domain_name("pay", "wallet.dash"), "pay.wallet.dash");
        assert_eq!(full_domain_name("dash", ""), "dash");
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("My-Wallet9"), "my-wallet9");
    }

    #[test]
    fn test_hash_binds_salt_and_name() {
        let salt = [3u8; 32];
        let base = salted_domain_hash(&salt, "wallet.dash");

        assert_eq!(base, sha256d(&[&salt[..], b"wallet.dash"].concat()));
        assert_ne!(base, salted_domain_hash(&salt, "wallet.dash2"));

        let mut other_salt = salt;
        other_salt[0] ^= 1;
        assert_ne!(base, salted_domain_hash(&other_salt, "wallet.dash"));
    }

    #[test]
    fn test_top_level_hash_has_no_trailing_dot() {
        let salt = [5u8; 32];
        let hash = salted_domain_hash(&salt, &full_domain_name("dash", ""));

        assert_eq!(hash, sha256d(&[&salt[..], b"dash"].concat()));
        assert_ne!(hash, salted_domain_hash(&salt, "dash."));
    }
}
