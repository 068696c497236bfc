//! Password strength rules for the account settings form.
//!
//! Evaluation is synchronous and never touches the identity provider, so the
//! console can report unmet rules inline before attempting a change.

use serde::Serialize;

/// Minimum password length accepted by the console.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length accepted by the console.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// A single password rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordRequirement {
    MinLength,
    MaxLength,
    Uppercase,
    Lowercase,
    Digit,
    Symbol,
}

impl PasswordRequirement {
    /// Inline message shown next to the password field.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::MinLength => "Use at least 8 characters.",
            Self::MaxLength => "Use at most 128 characters.",
            Self::Uppercase => "Add an uppercase letter.",
            Self::Lowercase => "Add a lowercase letter.",
            Self::Digit => "Add a number.",
            Self::Symbol => "Add a symbol such as ! or #.",
        }
    }
}

/// Result of evaluating a candidate password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    /// Number of character-class rules satisfied (0-4).
    pub score: u8,
    /// Rules the password does not meet, in display order.
    pub unmet: Vec<PasswordRequirement>,
}

impl PasswordStrength {
    /// Evaluate a password against every rule.
    #[must_use]
    pub fn evaluate(password: &str) -> Self {
        let length = password.chars().count();
        let mut unmet = Vec::new();

        if length < MIN_PASSWORD_LENGTH {
            unmet.push(PasswordRequirement::MinLength);
        }
        if length > MAX_PASSWORD_LENGTH {
            unmet.push(PasswordRequirement::MaxLength);
        }

        let classes = [
            (
                PasswordRequirement::Uppercase,
                password.chars().any(char::is_uppercase),
            ),
            (
                PasswordRequirement::Lowercase,
                password.chars().any(char::is_lowercase),
            ),
            (
                PasswordRequirement::Digit,
                password.chars().any(|c| c.is_ascii_digit()),
            ),
            (
                PasswordRequirement::Symbol,
                password
                    .chars()
                    .any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
            ),
        ];

        let mut score = 0;
        for (requirement, satisfied) in classes {
            if satisfied {
                score += 1;
            } else {
                unmet.push(requirement);
            }
        }

        Self { score, unmet }
    }

    /// Whether every rule is met.
    #[must_use]
    pub fn is_acceptable(&self) -> bool {
        self.unmet.is_empty()
    }

    /// Inline messages for the unmet rules.
    #[must_use]
    pub fn messages(&self) -> Vec<&'static str> {
        self.unmet.iter().map(|r| r.message()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strong_password_is_acceptable() {
        let strength = PasswordStrength::evaluate("Tr0ub4dor&3x");
        assert!(strength.is_acceptable());
        assert_eq!(strength.score, 4);
    }

    #[test]
    fn short_lowercase_password_lists_every_gap() {
        let strength = PasswordStrength::evaluate("abc");
        assert_eq!(
            strength.unmet,
            vec![
                PasswordRequirement::MinLength,
                PasswordRequirement::Uppercase,
                PasswordRequirement::Digit,
                PasswordRequirement::Symbol,
            ]
        );
        assert_eq!(strength.score, 1);
        assert_eq!(strength.messages()[0], "Use at least 8 characters.");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // Seven multi-byte characters are still too short.
        let strength = PasswordStrength::evaluate("Éé1!Éé1");
        assert!(strength.unmet.contains(&PasswordRequirement::MinLength));
    }

    #[test]
    fn overly_long_password_is_rejected() {
        let long = format!("Aa1!{}", "x".repeat(MAX_PASSWORD_LENGTH));
        let strength = PasswordStrength::evaluate(&long);
        assert_eq!(strength.unmet, vec![PasswordRequirement::MaxLength]);
    }
}
