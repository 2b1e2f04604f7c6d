pub mod handlers;

pub use handlers::*;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;

use crate::service::DocumentService;

/// 共享状态
pub type AppState = Arc<DocumentService>;

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // 收货费用分摊
        .route("/api/grn/distribute", post(distribute))
        .route("/api/grn/distribute/batch", post(distribute_batch))
        // 单据存取与导出
        .route("/api/documents", post(create_document).get(list_documents))
        .route(
            "/api/documents/:id",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route("/api/documents/:id/export", get(export_document))
        .layer(ServiceBuilder::new().layer(middleware::from_fn(log_request)))
        .with_state(state)
}

/// 请求日志
async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    tracing::info!("{} {} -> {} ({:?})", method, uri, response.status(), start.elapsed());
    response
}
