//! Password policy enforcement for new passwords.

use portal_core::config::auth::AuthConfig;
use portal_core::error::AppError;
use zxcvbn::Score;

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length in characters.
    min_length: usize,
    /// Minimum zxcvbn score.
    min_score: Score,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            min_score: score_from(config.password_min_score),
        }
    }

    /// Validates a password, returning the first violation found.
    ///
    /// `user_inputs` are words (such as the username) that make a password
    /// easier to guess.
    pub fn validate(&self, password: &str, user_inputs: &[&str]) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "password must be at least {} characters long",
                self.min_length
            )));
        }

        let estimate = zxcvbn::zxcvbn(password, user_inputs);
        if estimate.score() < self.min_score {
            return Err(AppError::validation(
                "password is too weak; choose a less predictable password",
            ));
        }

        Ok(())
    }
}

fn score_from(raw: u8) -> Score {
    match raw {
        0 => Score::Zero,
        1 => Score::One,
        2 => Score::Two,
        3 => Score::Three,
        _ => Score::Four,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_too_short() {
        let err = validator().validate("Ab1!", &[]).unwrap_err();
        assert!(err.message.contains("at least 8"));
    }

    #[test]
    fn test_too_weak() {
        assert!(validator().validate("password", &[]).is_err());
        assert!(validator().validate("alice2024", &["alice"]).is_err());
    }

    #[test]
    fn test_strong_enough() {
        assert!(validator().validate("correct-horse-battery-staple", &[]).is_ok());
    }
}
