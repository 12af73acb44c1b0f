//! Shared-secret policy for runs and administrative endpoints.

/// Minimum accepted secret length, in bytes after trimming.
pub const MIN_SECRET_LEN: usize = 16;

/// Values shipped in sample configs that must never be accepted.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "changeme",
    "change-me",
    "change_me",
    "secret",
    "your-secret",
    "your-secret-here",
    "your_secret_here",
    "replace-me",
    "replace-with-a-long-random-string",
    "placeholder",
    "xxxxxxxxxxxxxxxx",
    "0000000000000000",
];

/// Why a shared secret is considered not configured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretError {
    /// Empty or whitespace only
    #[error("shared secret is not set")]
    Missing,

    /// Shorter than [`MIN_SECRET_LEN`]
    #[error("shared secret is shorter than {min} characters")]
    TooShort {
        /// Required minimum
        min: usize,
    },

    /// Matches a known placeholder
    #[error("shared secret is still a placeholder value")]
    Placeholder,
}

/// Check that `secret` is usable.
pub fn check_shared_secret(secret: &str) -> Result<(), SecretError> {
    let secret = secret.trim();
    if secret.is_empty() {
        return Err(SecretError::Missing);
    }
    let lowered = secret.to_lowercase();
    if PLACEHOLDER_SECRETS.contains(&lowered.as_str()) {
        return Err(SecretError::Placeholder);
    }
    if secret.len() < MIN_SECRET_LEN {
        return Err(SecretError::TooShort {
            min: MIN_SECRET_LEN,
        });
    }
    Ok(())
}
