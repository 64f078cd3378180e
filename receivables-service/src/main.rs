use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use sqlx::PgPool;
use tokio::net::TcpListener;

use common_auth::{JwtConfig, JwtVerifier};
use receivables_service::config::load_service_config;
use receivables_service::postgres::PgLedgerStore;
use receivables_service::store::LedgerStore;
use receivables_service::tokens::TokenIssuer;
use receivables_service::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let config = load_service_config()?;

    let db_pool = PgPool::connect(&config.database_url).await?;

    let mut jwt_config = JwtConfig::new(config.jwt_secret.as_str())?;
    if let Some(leeway) = config.jwt_leeway_seconds {
        jwt_config = jwt_config.with_leeway(leeway);
    }
    let jwt_verifier = Arc::new(JwtVerifier::new(jwt_config.clone()));
    let issuer = Arc::new(TokenIssuer::new(&jwt_config, config.token_ttl_seconds));

    let ledger: Arc<dyn LedgerStore> = Arc::new(PgLedgerStore::new(db_pool.clone()));

    let state = AppState {
        db: db_pool,
        ledger,
        jwt_verifier,
        issuer,
    };

    let app = build_router(state, &config.allowed_origins);

    let ip: IpAddr = config.host.parse()?;
    let addr = SocketAddr::from((ip, config.port));

    println!("starting receivables-service on {addr}");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
