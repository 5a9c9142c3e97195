//! Shared-secret credential checking.
//!
//! The only authentication the service performs: the caller's secret must
//! equal the configured one. Comparison runs in time independent of where the
//! first mismatching byte is.

use std::fmt;

use crate::errors::DeployError;

/// Checks request secrets against the configured value.
#[derive(Clone)]
pub struct CredentialChecker {
    expected: Option<String>,
}

impl CredentialChecker {
    /// Creates a checker. `None` means no secret is configured and every check
    /// fails with [`DeployError::Config`].
    pub fn new(expected: Option<String>) -> Self {
        Self {
            expected: expected.filter(|s| !s.is_empty()),
        }
    }

    /// Returns `true` if a secret is configured.
    pub fn is_configured(&self) -> bool {
        self.expected.is_some()
    }

    /// Fails with [`DeployError::Auth`] unless `secret` matches.
    pub fn check(&self, secret: &str) -> Result<(), DeployError> {
        let expected = self
            .expected
            .as_deref()
            .ok_or_else(|| DeployError::config("shared secret is not configured"))?;

        if constant_time_eq(expected.as_bytes(), secret.as_bytes()) {
            Ok(())
        } else {
            Err(DeployError::Auth)
        }
    }
}

// Never print the secret.
impl fmt::Debug for CredentialChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialChecker")
            .field("configured", &self.is_configured())
            .finish()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    // Length is not secret; the contents are.
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
