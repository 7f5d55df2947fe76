//! Password strength advice.  Advisory only; never blocks encryption.

use std::fmt;

/// Characters that satisfy the special-character rule.
pub const SPECIAL_CHARS: &str = "~`!@#$%^&*()_+-=[]{}|\\<,>.?/;:\"'";
pub const MIN_LEN: usize = 8;

/// The first rule a password fails, checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    Strong,
    NeedsUppercase,
    NeedsLowercase,
    NeedsDigit,
    TooShort,
    NeedsSpecial,
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advice::Strong         => write!(f, "Perfect"),
            Advice::NeedsUppercase => write!(f, "Password should contain uppercase letters"),
            Advice::NeedsLowercase => write!(f, "Password should contain lowercase letters"),
            Advice::NeedsDigit     => write!(f, "Password should contain numbers"),
            Advice::TooShort       => write!(f, "Password should be at least {MIN_LEN} characters in length"),
            Advice::NeedsSpecial   => write!(f, "Password should contain at least 1 special character ({SPECIAL_CHARS})"),
        }
    }
}

pub fn advise(password: &str) -> Advice {
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        Advice::NeedsUppercase
    } else if !password.chars().any(|c| c.is_ascii_lowercase()) {
        Advice::NeedsLowercase
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Advice::NeedsDigit
    } else if password.chars().count() < MIN_LEN {
        Advice::TooShort
    } else if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        Advice::NeedsSpecial
    } else {
        Advice::Strong
    }
}
