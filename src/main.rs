mod config;
mod errors;
mod handlers;
mod models;
mod services;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::limit::RequestBodyLimitLayer;

use crate::{config::Config, services::DocumentStore};

#[tokio::main]
async fn main() {
    // Initialize basic tracing subscriber
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::load().expect("Failed to load configuration");

    // Initialize the document store shared by both resources
    let store = DocumentStore::new();

    let app = app(store, config.clone());

    println!("Server running");
    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", config.server.host, config.server.port)
    )
    .await
    .expect("Failed to bind server");

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Failed to start server");
}

// Router assembly, kept out of main so the whole route table reads in one place
fn app(store: DocumentStore, config: Config) -> Router {
    let api = Router::new()
        // User directory routes
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/users/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        // Task ledger routes
        .route(
            "/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/tasks/:id",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        // Add state
        .with_state((store, config.clone()));

    Router::new()
        .nest(&config.api.prefix, api)
        // Request body limits from config
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.server.max_body_size))
}
