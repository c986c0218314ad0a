//! In-memory password challenge.

use suitegate_core::SuiteId;

/// An open request for a suite's password.
///
/// Lives only while the unlock modal is open and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordChallenge {
    target: SuiteId,
    input_value: String,
    error_message: Option<String>,
}

impl PasswordChallenge {
    pub fn new(target: SuiteId) -> Self {
        Self {
            target,
            input_value: String::new(),
            error_message: None,
        }
    }

    pub fn target(&self) -> &SuiteId {
        &self.target
    }

    pub fn input_value(&self) -> &str {
        &self.input_value
    }

    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input_value = value.into();
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Keep the challenge open with a user-facing error.
    pub fn reject(&mut self, message: impl Into<String>) {
        self.error_message = Some(message.into());
    }
}
