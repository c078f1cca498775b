//! English defaults.

/// Copy button labels.
pub mod clipboard {
    /// Label shown while a copy confirmation is visible.
    pub const COPIED_LABEL: &str = "Copied!";
}

/// Quiz feedback messages.
pub mod quiz {
    /// Opens every message after a correct answer.
    pub const CORRECT_PREFIX: &str = "✓ Correct! ";
    /// Default text after [`CORRECT_PREFIX`].
    pub const CORRECT_FEEDBACK: &str = "Well done!";
    /// Opens every message after a wrong answer.
    pub const INCORRECT_PREFIX: &str = "✗ Incorrect. ";
    /// Default text after [`INCORRECT_PREFIX`].
    pub const INCORRECT_FEEDBACK: &str = "Try again!";
}
