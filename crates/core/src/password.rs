//! Strong password generation
//!
//! Composition is a pure function of the policy and the random source:
//! fixed counts of special, numeric and uppercase characters, the remainder
//! drawn from the full alphabet, then one full shuffle.

use rand::seq::SliceRandom;
use rand::Rng;
use scratchforce_domain::{ForceError, PasswordPolicy, Result};

pub const SPECIAL_CHARS: &str = "!@#$%&*";
pub const NUMERIC_CHARS: &str = "0123456789";
pub const UPPER_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWER_CHARS: &str = "abcdefghijklmnopqrstuvwxyz";

fn pick<R: Rng>(rng: &mut R, set: &str, count: usize, out: &mut Vec<char>) {
    let chars: Vec<char> = set.chars().collect();
    for _ in 0..count {
        out.push(chars[rng.gen_range(0..chars.len())]);
    }
}

/// Generate a password satisfying `policy`.
///
/// # Errors
/// Returns `ForceError::InvalidInput` when the policy length is zero or
/// smaller than the sum of its minimums.
pub fn generate_password<R: Rng>(policy: &PasswordPolicy, rng: &mut R) -> Result<String> {
    if policy.length == 0 || policy.required() > policy.length {
        return Err(ForceError::InvalidInput(format!(
            "password length {} cannot hold {} required characters",
            policy.length,
            policy.required()
        )));
    }

    let alphabet: String = [LOWER_CHARS, UPPER_CHARS, SPECIAL_CHARS, NUMERIC_CHARS].concat();
    let mut chars = Vec::with_capacity(policy.length);

    pick(rng, SPECIAL_CHARS, policy.min_special, &mut chars);
    pick(rng, NUMERIC_CHARS, policy.min_numeric, &mut chars);
    pick(rng, UPPER_CHARS, policy.min_upper, &mut chars);
    pick(rng, &alphabet, policy.length - policy.required(), &mut chars);

    chars.shuffle(rng);
    Ok(chars.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn count_in(password: &str, set: &str) -> usize {
        password.chars().filter(|c| set.contains(*c)).count()
    }

    #[test]
    fn test_default_policy_composition() {
        let mut rng = StdRng::seed_from_u64(7);
        let password = generate_password(&PasswordPolicy::default(), &mut rng).unwrap();

        assert_eq!(password.chars().count(), 16);
        assert!(count_in(&password, SPECIAL_CHARS) >= 2);
        assert!(count_in(&password, NUMERIC_CHARS) >= 2);
        assert!(count_in(&password, UPPER_CHARS) >= 2);
    }

    #[test]
    fn test_same_seed_same_password() {
        let policy = PasswordPolicy::default();
        let first = generate_password(&policy, &mut StdRng::seed_from_u64(42)).unwrap();
        let second = generate_password(&policy, &mut StdRng::seed_from_u64(42)).unwrap();
        let other = generate_password(&policy, &mut StdRng::seed_from_u64(43)).unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn test_minimums_hold_across_seeds() {
        let policy = PasswordPolicy { length: 8, min_special: 3, min_numeric: 3, min_upper: 2 };
        for seed in 0..200 {
            let password = generate_password(&policy, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(password.len(), 8);
            assert_eq!(count_in(&password, SPECIAL_CHARS), 3);
            assert_eq!(count_in(&password, NUMERIC_CHARS), 3);
            assert_eq!(count_in(&password, UPPER_CHARS), 2);
        }
    }

    #[test]
    fn test_policy_exceeding_length_is_rejected() {
        let policy = PasswordPolicy { length: 4, min_special: 2, min_numeric: 2, min_upper: 2 };
        let result = generate_password(&policy, &mut StdRng::seed_from_u64(1));
        assert!(matches!(result, Err(ForceError::InvalidInput(_))));
    }
}
