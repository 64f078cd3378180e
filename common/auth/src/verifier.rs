use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;
use tracing::debug;

use crate::claims::Claims;
use crate::config::JwtConfig;
use crate::error::AuthResult;

/// HS256 verifier for session tokens, built once at startup from the shared
/// secret. Tokens in this scheme carry no issuer or audience claims, so
/// validation covers signature and expiry.
#[derive(Clone)]
pub struct JwtVerifier {
    config: JwtConfig,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(config: JwtConfig) -> Self {
        let decoding = DecodingKey::from_secret(config.secret());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_seconds.into();
        validation.validate_aud = false;
        Self {
            config,
            decoding,
            validation,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let token_data = decode::<Value>(token, &self.decoding, &self.validation)?;
        let claims = Claims::try_from(token_data.claims)?;
        debug!(subject = %claims.subject, "verified session token");
        Ok(claims)
    }
}
