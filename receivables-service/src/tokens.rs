use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use uuid::Uuid;

use common_auth::{JwtConfig, Role};

/// Signs session tokens with the same shared secret the verifier checks.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    ttl_seconds: i64,
}

#[derive(Debug, Clone)]
pub struct SessionSubject {
    pub user_id: Uuid,
    pub email: String,
    pub role: Option<Role>,
    pub business_id: Option<Uuid>,
}

pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub expires_in: i64,
    pub token_type: &'static str,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig, ttl_seconds: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret()),
            ttl_seconds,
        }
    }

    pub fn issue(&self, subject: &SessionSubject) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + Duration::seconds(self.ttl_seconds);

        let claims = SessionClaims {
            sub: subject.user_id.to_string(),
            email: &subject.email,
            role: subject.role.map(Role::as_str),
            bid: subject.business_id.map(|id| id.to_string()),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| anyhow!("Failed to sign session token: {err}"))?;

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: self.ttl_seconds,
            token_type: "Bearer",
        })
    }
}

#[derive(Serialize)]
struct SessionClaims<'a> {
    sub: String,
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bid: Option<String>,
    exp: i64,
    iat: i64,
}
