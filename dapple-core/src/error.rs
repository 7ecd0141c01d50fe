use std::fmt::{self, Display};

/// A required argument was absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgumentNullError {
    pub parameter: &'static str,
}

impl ArgumentNullError {
    pub const fn new(parameter: &'static str) -> Self {
        Self { parameter }
    }
}

impl Display for ArgumentNullError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value cannot be null (parameter `{}`)", self.parameter)
    }
}

impl std::error::Error for ArgumentNullError {}
