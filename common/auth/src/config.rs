use std::fmt;

use crate::error::{AuthError, AuthResult};

/// Runtime configuration for session-token verification. The signing secret
/// is fixed at construction; there is no fallback value, so a deployment
/// without one fails before the service accepts traffic.
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    /// Allowable clock skew in seconds when validating exp.
    pub leeway_seconds: u32,
}

impl JwtConfig {
    /// Construct config with the default 30 second leeway. Rejects an empty
    /// or whitespace-only secret.
    pub fn new(secret: impl Into<String>) -> AuthResult<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(AuthError::EmptySecret);
        }
        Ok(Self {
            secret,
            leeway_seconds: 30,
        })
    }

    /// Adjust the allowed leeway.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    pub fn secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

// Keeps the secret out of debug logs.
impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_secret() {
        assert!(matches!(JwtConfig::new(""), Err(AuthError::EmptySecret)));
        assert!(matches!(JwtConfig::new("   "), Err(AuthError::EmptySecret)));
    }

    #[test]
    fn defaults_to_thirty_second_leeway() {
        let config = JwtConfig::new("a-long-shared-secret").unwrap();
        assert_eq!(config.leeway_seconds, 30);
        assert_eq!(config.with_leeway(5).leeway_seconds, 5);
    }

    #[test]
    fn debug_redacts_secret() {
        let config = JwtConfig::new("a-long-shared-secret").unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("a-long-shared-secret"));
    }
}
