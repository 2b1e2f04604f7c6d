use docgen_rust::config::StorageBackend;
use docgen_rust::{api, create_pool, AppConfig, DocumentService, KeyValueStore, MemoryStore, PgStore};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 选择存储后端
    let store: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory document store (data is lost on exit)");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::Postgres => {
            let url = config.storage.database_url.as_deref().unwrap_or_default();
            let pool = create_pool(url, config.storage.max_connections).await?;
            info!("Database pool created");

            let store = PgStore::new(pool);
            store.ensure_schema().await?;
            Arc::new(store)
        }
    };

    let service = Arc::new(DocumentService::new(store));
    let app = api::router(service);

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/grn/distribute              - receiving cost distribution");
    info!("  POST /api/grn/distribute/batch        - batch distribution");
    info!("  POST/GET /api/documents               - create / list documents");
    info!("  GET/PUT/DELETE /api/documents/:id     - single document");
    info!("  GET /api/documents/:id/export?format= - csv | html | json");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
