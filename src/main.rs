use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use therapy_chat_backend::config::Config;
use therapy_chat_backend::routes;
use therapy_chat_backend::services::adapter::ChatAdapter;
use therapy_chat_backend::services::memory::InMemoryStore;
use therapy_chat_backend::services::provider::GeminiChat;
use therapy_chat_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::from_env()?;

    let provider = Arc::new(GeminiChat::new(&cfg)?);
    let memory = InMemoryStore::new(Duration::from_secs(cfg.thread_ttl_secs));
    spawn_purge_task(memory.clone());

    let adapter = ChatAdapter::new(cfg.system_prompt.clone(), provider, Arc::new(memory));
    let state = Arc::new(AppState::new(adapter));

    let cors = CorsLayer::very_permissive();

    let app = routes::create_router()
        .route("/", get(|| async { "therapy chat backend up" }))
        .with_state(state)
        .layer(cors);

    let addr = format!("{}:{}", cfg.app_host, cfg.app_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("chat backend listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn spawn_purge_task(store: InMemoryStore) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(Duration::from_secs(60));
        loop {
            tick.tick().await;
            let removed = store.purge_expired().await;
            if removed > 0 {
                tracing::debug!("purged {removed} idle threads");
            }
        }
    });
}
