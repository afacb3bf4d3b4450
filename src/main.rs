//! Tillflow billing service entrypoint.
//!
//! Wires the PostgreSQL and Redis adapters into the application handlers,
//! mounts the subscription API under `/api`, and runs the expiry sweeper
//! in the background until shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use tillflow_billing::adapters::auth::{JwtConfig, JwtTokenVerifier};
use tillflow_billing::adapters::events::RedisEventPublisher;
use tillflow_billing::adapters::http::middleware::{
    attach_info_middleware, auth_middleware, AuthState, EntitlementState,
};
use tillflow_billing::adapters::http::{subscription_router, SubscriptionAppState};
use tillflow_billing::adapters::payos::{MockPaymentGateway, PayosConfig, PayosPaymentGateway};
use tillflow_billing::adapters::postgres::{
    PostgresAccountDirectory, PostgresNotificationStore, PostgresPaymentHistoryRepository,
    PostgresSubscriptionRepository,
};
use tillflow_billing::adapters::scheduler::{ExpirySweeper, ExpirySweeperConfig};
use tillflow_billing::application::{
    AttachSubscriptionInfoHandler, BootstrapTrialHandler, CheckEntitlementHandler,
    SweepExpiredHandler,
};
use tillflow_billing::config::{AppConfig, Environment, ServerConfig};
use tillflow_billing::domain::subscription::PayosWebhookVerifier;
use tillflow_billing::ports::{
    AccountDirectory, EventPublisher, NotificationStore, PaymentGateway,
    PaymentHistoryRepository, SubscriptionRepository,
};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("tillflow-billing exited with error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.server);
    config.validate().context("invalid configuration")?;

    info!(
        environment = config.server.environment.as_str(),
        "Starting Tillflow billing service"
    );

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .idle_timeout(config.database.idle_timeout())
        .max_lifetime(config.database.max_lifetime())
        .connect(&config.database.url)
        .await
        .context("failed to connect to PostgreSQL")?;
    info!("PostgreSQL connection established");

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run database migrations")?;
        info!("Database migrations applied");
    }

    let redis_client =
        redis::Client::open(config.redis.url.as_str()).context("invalid Redis URL")?;
    let redis_conn = tokio::time::timeout(
        config.redis.timeout(),
        redis_client.get_multiplexed_tokio_connection(),
    )
    .await
    .context("timed out connecting to Redis")?
    .context("failed to connect to Redis")?;
    info!("Redis connection established");

    let subscription_repository: Arc<dyn SubscriptionRepository> =
        Arc::new(PostgresSubscriptionRepository::new(pool.clone()));
    let payment_history: Arc<dyn PaymentHistoryRepository> =
        Arc::new(PostgresPaymentHistoryRepository::new(pool.clone()));
    let account_directory: Arc<dyn AccountDirectory> =
        Arc::new(PostgresAccountDirectory::new(pool.clone()));
    let notification_store: Arc<dyn NotificationStore> =
        Arc::new(PostgresNotificationStore::new(pool.clone()));
    let event_publisher: Arc<dyn EventPublisher> = Arc::new(
        RedisEventPublisher::new(redis_conn).with_channel(config.redis.events_channel.clone()),
    );

    let payment_gateway: Arc<dyn PaymentGateway> = if config.payment.is_configured() {
        let mut payos_config = PayosConfig::new(
            config.payment.payos_client_id.clone(),
            config.payment.payos_api_key.clone(),
            config.payment.payos_checksum_key.clone(),
            config.payment.return_url.clone(),
            config.payment.cancel_url.clone(),
        );
        if let Some(base_url) = &config.payment.payos_base_url {
            payos_config = payos_config.with_base_url(base_url.clone());
        }
        Arc::new(PayosPaymentGateway::new(payos_config))
    } else {
        warn!("PayOS credentials not configured; checkout will use the stub gateway");
        Arc::new(MockPaymentGateway::new())
    };

    let webhook_verifier = config
        .payment
        .webhook_secret()
        .map(PayosWebhookVerifier::new);
    if webhook_verifier.is_none() {
        warn!("No webhook secret configured; payment webhooks will be rejected");
    }

    let mut jwt_config = JwtConfig::new(config.auth.jwt_secret.clone());
    if let Some(issuer) = &config.auth.jwt_issuer {
        jwt_config = jwt_config.with_issuer(issuer.clone());
    }
    if let Some(audience) = &config.auth.jwt_audience {
        jwt_config = jwt_config.with_audience(audience.clone());
    }
    let token_verifier: AuthState = Arc::new(JwtTokenVerifier::new(jwt_config));

    let app_state = SubscriptionAppState {
        subscription_repository: subscription_repository.clone(),
        payment_history: payment_history.clone(),
        account_directory: account_directory.clone(),
        payment_gateway,
        event_publisher: event_publisher.clone(),
        notification_store,
        webhook_verifier,
    };

    let bootstrap = Arc::new(BootstrapTrialHandler::new(
        subscription_repository.clone(),
        event_publisher.clone(),
    ));
    let entitlement_state = EntitlementState {
        gate: Arc::new(CheckEntitlementHandler::new(
            subscription_repository.clone(),
            account_directory.clone(),
            bootstrap,
        )),
        attach_info: Arc::new(AttachSubscriptionInfoHandler::new(
            subscription_repository.clone(),
            account_directory.clone(),
        )),
    };

    let app = Router::new()
        .route("/healthz", get(health_check))
        .nest("/api", subscription_router())
        .with_state(app_state)
        .layer(axum::middleware::from_fn_with_state(
            entitlement_state,
            attach_info_middleware,
        ))
        .layer(axum::middleware::from_fn_with_state(
            token_verifier,
            auth_middleware,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&config))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper_handle = if config.sweeper.enabled {
        let handler = Arc::new(SweepExpiredHandler::new(
            subscription_repository.clone(),
            account_directory.clone(),
        ));
        let sweeper = ExpirySweeper::with_config(
            handler,
            ExpirySweeperConfig::default().with_interval(config.sweeper.interval()),
        );
        Some(tokio::spawn(async move { sweeper.run(shutdown_rx).await }))
    } else {
        info!("Expiry sweeper disabled by configuration");
        None
    };

    let addr = config.server.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "Tillflow billing service listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweeper_handle {
        let _ = handle.await;
    }
    info!("Tillflow billing service stopped");

    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    // RUST_LOG wins over the configured default when both are set.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&server.log_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if server.environment == Environment::Production {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(origins))
    }
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
