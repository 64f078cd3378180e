use axum::response::{IntoResponse, Response};
use common_http_errors::ApiError;
use thiserror::Error;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authorization header missing")]
    MissingAuthorization,
    #[error("authorization header malformed")]
    InvalidAuthorization,
    #[error("token verification failed: {0}")]
    Verification(String),
    #[error("invalid claim '{0}' with value '{1}'")]
    InvalidClaim(&'static str, String),
    #[error("malformed claim payload: {0}")]
    InvalidJson(String),
    #[error("verification secret must not be empty")]
    EmptySecret,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(value: jsonwebtoken::errors::Error) -> Self {
        Self::Verification(value.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::MissingAuthorization | AuthError::InvalidAuthorization => {
                ApiError::unauthorized("missing_token", "No token provided.")
            }
            // A credential that fails signature, expiry, or claim-shape checks
            // is the same thing to the caller: not a usable token.
            AuthError::Verification(_)
            | AuthError::InvalidClaim(_, _)
            | AuthError::InvalidJson(_) => {
                ApiError::unauthorized("invalid_token", "Invalid or expired token.")
            }
            AuthError::EmptySecret => ApiError::internal(value),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn header_failures_render_missing_token() {
        let resp = AuthError::MissingAuthorization.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "missing_token");
    }

    #[test]
    fn verification_failures_render_invalid_token() {
        let resp = AuthError::Verification("signature".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "invalid_token");

        let resp = AuthError::InvalidClaim("sub", "garbage".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "invalid_token");
    }
}
