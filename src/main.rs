use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use event_booker::{
    config::Config,
    controllers,
    database::Database,
    services::{notify::Notifier, sweeper::Sweeper},
    AppState,
};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.app.rust_log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Event Booker API");

    // Connect to the database
    let db = Database::new(&config.database)
        .await
        .expect("Failed to connect to database");
    info!("Database connected");

    // Run migrations
    db.run_migrations()
        .await
        .expect("Failed to run migrations");

    let notifier = Notifier::from_config(&config);

    // Create the shared application state
    let app_state = Arc::new(AppState {
        db,
        config: config.clone(),
        notifier,
    });

    // --- Start background tasks ---

    // Отмена просроченных pending-броней по расписанию
    let sweeper = Sweeper::new(app_state.clone());
    task::spawn(sweeper.run());

    // --- Start the web server ---

    let app = Router::new()
        .route("/", get(|| async { "Event Booker API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        // Mount the routes from the controllers module
        .nest("/api", controllers::routes())
        // Pass the application state to the router
        .with_state(app_state.clone())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.app.host, config.app.port)
        .parse()
        .expect("HOST and PORT must form a valid socket address");
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app.into_make_service())
        .await
        .unwrap();
}
