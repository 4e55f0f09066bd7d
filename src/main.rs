use std::sync::Arc;

use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matematch::conversation::{ConversationService, ConversationStore, PgConversationStore};
use matematch::db::{create_pool, run_migrations};
use matematch::message::{MessageService, MessageStore, PgMessageStore};
use matematch::routes::create_router;
use matematch::state::{AppState, Config};
use matematch::user::{PgUserStore, UserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,matematch=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    tracing::info!("Connecting to database...");
    let db = create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await?;

    // Create message broadcaster
    let (message_tx, _) = broadcast::channel(config.broadcast_capacity);

    // Create stores
    let conversation_store: Arc<dyn ConversationStore> =
        Arc::new(PgConversationStore::new(db.clone()));
    let message_store: Arc<dyn MessageStore> = Arc::new(PgMessageStore::new(db.clone()));
    let user_store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(db.clone()));

    // Create services
    let conversation_service = ConversationService::new(
        conversation_store.clone(),
        message_store.clone(),
        user_store.clone(),
    );
    let message_service = MessageService::new(conversation_store, message_store);

    // Create application state
    let state = AppState {
        db: db.clone(),
        config: config.clone(),
        message_tx,
        users: user_store,
        conversation_service,
        message_service,
    };

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
