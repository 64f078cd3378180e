use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, Json};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::{error, warn};
use uuid::Uuid;

use common_auth::Role;
use common_http_errors::{ApiError, ApiResult, ApiSuccess};

use crate::tokens::SessionSubject;
use crate::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: Uuid,
    pub business_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub role: Option<Role>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub token: String,
    pub expires_in: i64,
    pub token_type: &'static str,
    pub user: SessionUser,
}

#[derive(FromRow)]
struct AuthRow {
    id: Uuid,
    business_id: Option<Uuid>,
    name: String,
    email: String,
    role: String,
    password_hash: String,
}

pub async fn login_user(
    State(state): State<AppState>,
    Json(login): Json<LoginRequest>,
) -> ApiResult<Json<ApiSuccess<LoginData>>> {
    let LoginRequest { email, password } = login;
    let email = email.trim().to_ascii_lowercase();
    if email.is_empty() || password.is_empty() {
        return Err(invalid_credentials());
    }

    let auth_data = match sqlx::query_as::<_, AuthRow>(
        "SELECT id, business_id, name, email, role, password_hash
         FROM users WHERE lower(email) = $1",
    )
    .bind(&email)
    .fetch_optional(&state.db)
    .await
    .map_err(db_internal)?
    {
        Some(row) => row,
        None => return Err(invalid_credentials()),
    };

    let password_valid = match PasswordHash::new(&auth_data.password_hash) {
        Ok(parsed_hash) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok(),
        Err(_) => {
            warn!(user_id = %auth_data.id, "stored password hash is not parseable");
            false
        }
    };
    if !password_valid {
        return Err(invalid_credentials());
    }

    let role = Role::parse(&auth_data.role);
    let subject = SessionSubject {
        user_id: auth_data.id,
        email: auth_data.email.clone(),
        role,
        business_id: auth_data.business_id,
    };

    let issued = state.issuer.issue(&subject).map_err(|err| {
        error!(user_id = %auth_data.id, error = ?err, "failed to issue session token");
        ApiError::internal("Unable to issue session token.")
    })?;

    Ok(Json(ApiSuccess::new(LoginData {
        token: issued.token,
        expires_in: issued.expires_in,
        token_type: issued.token_type,
        user: SessionUser {
            id: auth_data.id,
            business_id: auth_data.business_id,
            name: auth_data.name,
            email: auth_data.email,
            role,
        },
    })))
}

pub fn hash_password(password: &str) -> ApiResult<String> {
    if password.trim().is_empty() {
        return Err(ApiError::bad_request(
            "invalid_password",
            "Password must not be empty.",
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| ApiError::internal(format!("Failed to hash password: {err}")))
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("invalid_credentials", "Invalid credentials. Please try again.")
}

fn db_internal(err: sqlx::Error) -> ApiError {
    ApiError::internal(format!("DB error: {err}"))
}
