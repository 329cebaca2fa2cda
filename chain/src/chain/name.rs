// Chain name format validation
//
// A chain name is identity: the chain address is the hash of the name and
// children are registered under it in the parent, so the format is strict.
// - Length: 3 to 19 characters
// - Only lowercase letters (a-z), digits (0-9) and underscore

use vela_common::config::{CHAIN_NAME_MAX_LENGTH, CHAIN_NAME_MIN_LENGTH};

pub fn is_valid_name(name: &str) -> bool {
    if name.len() < CHAIN_NAME_MIN_LENGTH || name.len() >= CHAIN_NAME_MAX_LENGTH {
        return false;
    }
    name.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(is_valid_name("main"));
        assert!(is_valid_name("side_1"));
        assert!(is_valid_name("abc"));
        assert!(is_valid_name("a__0"));
        assert!(is_valid_name(&"a".repeat(19)));
    }

    #[test]
    fn test_length_limits() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("ab"));
        assert!(is_valid_name("abc"));
        assert!(is_valid_name(&"x".repeat(19)));
        assert!(!is_valid_name(&"x".repeat(20)));
    }

    #[test]
    fn test_invalid_characters() {
        assert!(!is_valid_name("Main"));
        assert!(!is_valid_name("side-1"));
        assert!(!is_valid_name("side.1"));
        assert!(!is_valid_name("side 1"));
        assert!(!is_valid_name("chaîne"));
    }
}
