use common_http_errors::ApiError;
use tracing::warn;

use crate::extractors::AuthContext;
use crate::roles::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    Forbidden { required: Vec<Role> },
}

impl From<GuardError> for ApiError {
    fn from(value: GuardError) -> Self {
        match value {
            GuardError::Forbidden { required } => {
                let message = if required.is_empty() {
                    "Insufficient role".to_string()
                } else {
                    format!(
                        "Insufficient role. Required one of: {}",
                        required
                            .iter()
                            .map(|role| role.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )
                };
                ApiError::forbidden("insufficient_role", message)
            }
        }
    }
}

/// Role allow-list check, applied after authentication. Evaluation order:
/// a bypass-all role wins outright, an empty allow-list admits any
/// authenticated caller, and otherwise the caller's role must be a member.
/// A caller without a recognized role can only pass the first two gates.
pub fn ensure_role(auth: &AuthContext, allowed: &[Role]) -> Result<(), GuardError> {
    let role = auth.claims.role;

    if role.is_some_and(Role::bypasses_all) {
        return Ok(());
    }
    if allowed.is_empty() {
        return Ok(());
    }
    if role.is_some_and(|held| allowed.contains(&held)) {
        return Ok(());
    }

    warn!(
        subject = %auth.claims.subject,
        role = ?role,
        required = ?allowed,
        "role_check_failed"
    );
    Err(GuardError::Forbidden {
        required: allowed.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::Claims;
    use axum::response::IntoResponse;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn auth_with_role(role: Option<Role>) -> AuthContext {
        AuthContext {
            claims: Claims {
                subject: Uuid::new_v4(),
                email: "clerk@station.test".into(),
                role,
                business_id: None,
                expires_at: Utc::now() + Duration::hours(1),
                issued_at: Some(Utc::now()),
            },
            token: "unit-test-token".into(),
        }
    }

    #[test]
    fn super_owner_bypasses_any_allow_list() {
        let auth = auth_with_role(Some(Role::SuperOwner));
        ensure_role(&auth, &[Role::Admin]).expect("bypass");
        ensure_role(&auth, &[]).expect("bypass");
    }

    #[test]
    fn empty_allow_list_admits_any_authenticated_caller() {
        ensure_role(&auth_with_role(Some(Role::Cashier)), &[]).expect("admitted");
        ensure_role(&auth_with_role(None), &[]).expect("admitted");
    }

    #[test]
    fn member_role_is_admitted() {
        let auth = auth_with_role(Some(Role::Manager));
        ensure_role(&auth, &[Role::Manager, Role::Admin]).expect("admitted");
    }

    #[test]
    fn non_member_role_is_refused() {
        let auth = auth_with_role(Some(Role::Cashier));
        let err = ensure_role(&auth, &[Role::Admin, Role::Manager]).expect_err("refused");
        assert_eq!(
            err,
            GuardError::Forbidden {
                required: vec![Role::Admin, Role::Manager]
            }
        );
    }

    #[test]
    fn missing_role_never_matches_a_non_empty_list() {
        let auth = auth_with_role(None);
        ensure_role(&auth, &[Role::Admin]).expect_err("refused");
    }

    #[test]
    fn refusal_renders_forbidden_with_required_roles() {
        let auth = auth_with_role(Some(Role::Cashier));
        let err = ensure_role(&auth, &[Role::Admin, Role::Manager]).expect_err("refused");
        let resp = ApiError::from(err).into_response();
        assert_eq!(resp.status(), axum::http::StatusCode::FORBIDDEN);
        assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "insufficient_role");
    }
}
