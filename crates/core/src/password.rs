//! Password strength scoring for the registration form.

/// Minimum score a new account's password must reach.
pub const REQUIRED_STRENGTH: u8 = 2;

/// Minimum length when changing a password.
pub const MIN_CHANGE_LENGTH: usize = 6;

const LABELS: [&str; 5] = ["Very Weak", "Weak", "Fair", "Good", "Strong"];

/// Result of scoring a password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordStrength {
    /// 0 to 4, one point per satisfied rule.
    pub score: u8,
    /// The rules that were not satisfied, phrased for a `Needs: ...` hint.
    pub needs: Vec<&'static str>,
}

impl PasswordStrength {
    #[must_use]
    pub fn label(&self) -> &'static str {
        LABELS[usize::from(self.score.min(4))]
    }

    /// Width of the strength meter, in percent.
    #[must_use]
    pub fn meter_percent(&self) -> u8 {
        (self.score.min(4) + 1) * 20
    }

    /// CSS modifier for the meter, e.g. `strength-fair`.
    #[must_use]
    pub fn css_class(&self) -> String {
        format!("strength-{}", self.label().to_lowercase().replace(' ', "-"))
    }

    #[must_use]
    pub const fn is_acceptable(&self) -> bool {
        self.score >= REQUIRED_STRENGTH
    }
}

/// Score a password: one point each for eight or more characters, mixed
/// case, a digit, and a symbol.
#[must_use]
pub fn password_strength(password: &str) -> PasswordStrength {
    let rules: [(bool, &'static str); 4] = [
        (password.chars().count() >= 8, "at least 8 characters"),
        (
            password.chars().any(|c| c.is_ascii_lowercase())
                && password.chars().any(|c| c.is_ascii_uppercase()),
            "both uppercase and lowercase letters",
        ),
        (password.chars().any(|c| c.is_ascii_digit()), "at least one number"),
        (
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
            "at least one special character",
        ),
    ];

    let mut score = 0;
    let mut needs = Vec::new();
    for (passed, hint) in rules {
        if passed {
            score += 1;
        } else {
            needs.push(hint);
        }
    }

    PasswordStrength { score, needs }
}
