//! Platform ownership verification codes

use rand::distributions::Uniform;
use rand::Rng;

/// Length of a generated code
pub const CODE_LENGTH: usize = 8;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random code for a creator to post in their profile bio.
///
/// Codes are informational only, so no uniqueness check is made.
pub fn generate_verification_code() -> String {
    let mut rng = rand::thread_rng();
    let index = Uniform::from(0..ALPHABET.len());
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.sample(index)] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_code_shape() {
        for _ in 0..100 {
            let code = generate_verification_code();
            assert_eq!(code.len(), CODE_LENGTH);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_codes_vary() {
        let codes: HashSet<String> = (0..50).map(|_| generate_verification_code()).collect();
        assert!(codes.len() > 1);
    }
}
