//! Password policy enforcement for new credential secrets.

use sesmine_core::config::auth::PasswordPolicyConfig;
use zxcvbn::Score;

use crate::error::FieldViolation;

const FIELD: &str = "credential_secret";

/// Validates secret strength against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Policy settings.
    policy: PasswordPolicyConfig,
}

fn min_score(value: u8) -> Score {
    match value {
        0 => Score::Zero,
        1 => Score::One,
        2 => Score::Two,
        3 => Score::Three,
        _ => Score::Four,
    }
}

impl PasswordValidator {
    /// Creates a new validator from the password policy.
    pub fn new(policy: &PasswordPolicyConfig) -> Self {
        Self {
            policy: policy.clone(),
        }
    }

    /// Validates a secret against every configured rule.
    ///
    /// `user_inputs` (name, email, company) are penalised by the strength
    /// estimate. Returns every violation found, empty when the secret passes.
    pub fn validate(&self, secret: &str, user_inputs: &[&str]) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        if secret.chars().count() < self.policy.min_length {
            violations.push(FieldViolation::new(
                FIELD,
                "password_length",
                format!(
                    "Password must be at least {} characters long",
                    self.policy.min_length
                ),
            ));
        }

        if self.policy.require_uppercase && !secret.chars().any(|c| c.is_uppercase()) {
            violations.push(FieldViolation::new(
                FIELD,
                "password_uppercase",
                "Password must contain at least one uppercase letter",
            ));
        }

        if self.policy.require_number && !secret.chars().any(|c| c.is_ascii_digit()) {
            violations.push(FieldViolation::new(
                FIELD,
                "password_number",
                "Password must contain at least one number",
            ));
        }

        if self.policy.require_special && !secret.chars().any(|c| !c.is_alphanumeric()) {
            violations.push(FieldViolation::new(
                FIELD,
                "password_special",
                "Password must contain at least one special character",
            ));
        }

        if !secret.is_empty() && self.policy.min_strength > 0 {
            let estimate = zxcvbn::zxcvbn(secret, user_inputs);
            if estimate.score() < min_score(self.policy.min_strength) {
                violations.push(FieldViolation::new(
                    FIELD,
                    "password_strength",
                    "Password is too weak. Please use a stronger password with more entropy.",
                ));
            }
        }

        violations
    }
}
