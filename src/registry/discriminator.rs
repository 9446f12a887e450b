//! Name-derived discriminators
//!
//! Anchor prefixes every record, instruction and event with the first eight
//! bytes of `sha256("<namespace>:<name>")`.

use sha2::{Digest, Sha256};

/// Discriminator length used by name-derived discriminators
pub const DISCRIMINATOR_LEN: usize = 8;

/// Namespace for instruction discriminators
pub const GLOBAL_NAMESPACE: &str = "global";
/// Namespace for record discriminators
pub const ACCOUNT_NAMESPACE: &str = "account";
/// Namespace for event discriminators
pub const EVENT_NAMESPACE: &str = "event";

/// First eight bytes of `sha256("<namespace>:<name>")`
pub fn sighash(namespace: &str, name: &str) -> [u8; DISCRIMINATOR_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update(b":");
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();

    let mut out = [0u8; DISCRIMINATOR_LEN];
    out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    out
}

/// Instruction discriminator; instruction names are hashed in snake_case
pub fn instruction_discriminator(name: &str) -> [u8; DISCRIMINATOR_LEN] {
    sighash(GLOBAL_NAMESPACE, &to_snake_case(name))
}

/// Convert `camelCase` / `PascalCase` to `snake_case`
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let chars: Vec<char> = s.chars().collect();

    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev_lower = i > 0 && (chars[i - 1].is_ascii_lowercase() || chars[i - 1].is_ascii_digit());
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
            let prev_upper = i > 0 && chars[i - 1].is_ascii_uppercase();
            if prev_lower || (prev_upper && next_lower) {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_discriminators() {
        // Anchor's `initialize` instruction
        assert_eq!(
            instruction_discriminator("initialize"),
            [175, 175, 109, 31, 13, 152, 155, 237]
        );
        assert_eq!(
            sighash(ACCOUNT_NAMESPACE, "Counter"),
            [255, 176, 4, 245, 188, 253, 124, 25]
        );
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("initDemo"), "init_demo");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("createATA"), "create_ata");
        assert_eq!(to_snake_case("HTTPServer"), "http_server");
        assert_eq!(to_snake_case("mintV2"), "mint_v2");
    }

    #[test]
    fn test_camel_and_snake_hash_equal() {
        assert_eq!(
            instruction_discriminator("initDemo"),
            instruction_discriminator("init_demo")
        );
    }
}
