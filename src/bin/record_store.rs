// src/bin/record_store.rs

use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use staffsync::infra::{config, logging};
use staffsync::storage::seed;
use staffsync::transport;
use staffsync::{RecordStore, SchemaRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init_tracing();

    // --- Store Initialization ---
    println!("> Initializing record store...");
    let registry = SchemaRegistry::with_defaults();
    println!("> Tables: {}", registry.list_tables().join(", "));
    let store = Arc::new(RecordStore::new(registry));

    if config::seed_demo() {
        seed::seed_demo(&store).await?;
        for (table, rows) in store.counts().await {
            println!("> Seeded {} with {} rows.", table, rows);
        }
    } else {
        println!("> STAFFSYNC_SEED_DEMO is off; starting with empty tables.");
    }

    let public_key = config::store_public_key();
    let project_id = config::store_project_id();
    match (&public_key, &project_id) {
        (None, None) => println!("> No credentials configured; every request is accepted."),
        _ => println!(
            "> Requests must carry{}{}.",
            if public_key.is_some() { " the bearer key" } else { "" },
            project_id
                .as_deref()
                .map(|p| format!(" x-project-id={}", p))
                .unwrap_or_default()
        ),
    }

    let app_state = transport::http::AppState {
        store,
        public_key,
        project_id,
    };

    // --- API Server Initialization ---
    println!("> Starting API server...");
    let bind = config::bind_addr();
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    println!("> API server listening on http://{}", bind);
    println!("> Swagger UI available at http://{}/swagger-ui", bind);
    tracing::info!(%bind, "record store ready");

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\n> Shutdown signal received (Ctrl+C).");
            println!("> Graceful shutdown complete.");
        }
    }

    Ok(())
}
