mod app;
mod auth;
mod config;
mod db;
mod error;
mod handlers;
mod instagram;
mod mailer;
mod profile;
mod response;
mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::build_router;
use auth::jwt::JwtManager;
use config::Config;
use db::repositories::{PgLinkedAccountRepository, PgMagicLinkRepository, PgUserRepository};
use instagram::{GraphClient, InstagramEndpoints, InstagramOAuth};
use mailer::{LogMailer, MagicLinkMailer, ResendMailer};
use state::{AppState, Repositories};

pub fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(
            "info,influence_backend=debug,hyper_util=warn,tower_http=info",
        )
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let pool = db::connection::create_pool(&config.database_url, config.database_pool_size)?;
    let repos = Repositories {
        users: Arc::new(PgUserRepository::new(pool.clone())),
        accounts: Arc::new(PgLinkedAccountRepository::new(pool.clone())),
        magic_links: Arc::new(PgMagicLinkRepository::new(pool)),
    };

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?;

    let mailer: Arc<dyn MagicLinkMailer> = match &config.resend_api_key {
        Some(api_key) => Arc::new(ResendMailer::new(
            http.clone(),
            api_key.clone(),
            config.email_from.clone(),
            config.app_name.clone(),
            config.frontend_url.clone(),
        )),
        None => {
            tracing::warn!("RESEND_API_KEY not set, magic links are only logged");
            Arc::new(LogMailer::new(config.frontend_url.clone()))
        }
    };

    let endpoints = InstagramEndpoints::default();
    let graph = GraphClient::new(http.clone(), &endpoints.graph_url);
    let provider = Arc::new(InstagramOAuth::new(
        http,
        config.instagram.client_id.clone(),
        config.instagram.client_secret.clone(),
        config.instagram.redirect_uri.clone(),
        endpoints,
    ));

    let jwt = JwtManager::new(
        &config.jwt_secret,
        chrono::Duration::minutes(config.access_token_minutes),
        chrono::Duration::days(config.refresh_token_days),
    );

    Ok(AppState::new(
        jwt,
        repos,
        mailer,
        provider,
        graph,
        &config.social_email_domain,
    ))
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_origin(config.frontend_url.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

// ----------------- Main -----------------

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    setup_logging();
    tracing::info!("Starting influence-backend...");

    let config = Config::from_env()?;
    let app = build_router(build_state(&config)?).layer(cors_layer(&config)?);

    if config.is_production() && std::env::var("AWS_LAMBDA_FUNCTION_NAME").is_ok() {
        tracing::info!("Running in Lambda mode");
        lambda_http::run(app).await
    } else {
        tracing::info!("Running in local HTTP server mode");
        let addr = format!("{}:{}", config.server_host, config.server_port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!("Server running at http://{}", addr);
        axum::serve(listener, app).await?;

        Ok(())
    }
}
