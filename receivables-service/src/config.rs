use anyhow::{anyhow, Context, Result};
use std::env;

pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 86_400;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8086;

/// Runtime settings, read once at startup. `JWT_SECRET` has no default:
/// a deployment without one refuses to boot instead of signing tokens
/// with a guessable value.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_leeway_seconds: Option<u32>,
    pub token_ttl_seconds: i64,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
}

pub fn load_service_config() -> Result<ServiceConfig> {
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
    if jwt_secret.trim().is_empty() {
        return Err(anyhow!("JWT_SECRET must not be empty"));
    }

    let jwt_leeway_seconds = env::var("JWT_LEEWAY_SECONDS")
        .ok()
        .map(|value| parse_number(&value, "JWT_LEEWAY_SECONDS"))
        .transpose()?;

    let token_ttl_seconds = env::var("TOKEN_TTL_SECONDS")
        .ok()
        .map(|value| parse_number(&value, "TOKEN_TTL_SECONDS"))
        .transpose()?
        .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS);
    if token_ttl_seconds <= 0 {
        return Err(anyhow!("TOKEN_TTL_SECONDS must be positive"));
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .map(|value| parse_number(&value, "PORT"))
        .transpose()?
        .unwrap_or(DEFAULT_PORT);

    let allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|value| parse_origins(&value))
        .unwrap_or_else(default_origins);

    Ok(ServiceConfig {
        database_url,
        jwt_secret,
        jwt_leeway_seconds,
        token_ttl_seconds,
        host,
        port,
        allowed_origins,
    })
}

fn parse_number<T>(value: &str, key: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|err| anyhow!("Invalid {key} '{value}': {err}"))
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(|c| c == ',' || c == ';' || c == ' ')
        .filter_map(|item| {
            let origin = item.trim().trim_end_matches('/');
            if origin.is_empty() {
                None
            } else {
                Some(origin.to_string())
            }
        })
        .collect()
}

fn default_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
        "http://localhost:5173".to_string(),
    ]
}
