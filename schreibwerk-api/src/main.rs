use schreibwerk_common::model::auth::TokenSigner;
use schreibwerk_db::client::DbClient;
use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod server;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error connecting to database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Error running migrations: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

#[derive(Clone, Eq, PartialEq, Debug, Deserialize)]
struct Env {
    server_address: IpAddr,
    server_port: u16,
    database_url: String,
    database_max_connections: Option<u32>,
    token_secret: String,
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "schreibwerk_api=debug,\
                schreibwerk_db=debug,\
                schreibwerk_common=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(
            env.database_max_connections
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
        )
        .connect(&env.database_url)
        .await?;
    sqlx::migrate!("../schreibwerk-db/migrations")
        .run(&pool)
        .await?;

    let state = server::ServerState {
        db_client: Arc::new(DbClient::new(pool)),
        token_signer: TokenSigner::new(&env.token_secret),
    };

    let tracing_layer = TraceLayer::new_for_http();
    let app = server::routes()
        .with_state(state)
        .layer(tracing_layer);

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}
