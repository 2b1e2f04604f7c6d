use crate::error::DocError;
use crate::models::{DocumentBody, DocumentKind};
use crate::service::{cost_distributor, DistributionRequest, ExportFormat};
use axum::{
    extract::{Json, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::AppState;

/// 统一响应体
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 列表查询参数
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub kind: Option<String>,
}

/// 导出参数，默认 CSV
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

fn success<T: Serialize>(status: StatusCode, message: impl Into<String>, data: T) -> Response {
    let response = ApiResponse {
        success: true,
        message: message.into(),
        data: Some(data),
    };
    (status, Json(response)).into_response()
}

fn failure(err: DocError) -> Response {
    let status = match &err {
        DocError::NotFound(_) => StatusCode::NOT_FOUND,
        DocError::Validation(_) => StatusCode::BAD_REQUEST,
        _ => {
            tracing::error!("Request failed: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let response = ApiResponse::<()> {
        success: false,
        message: format!("Error: {}", err),
        data: None,
    };
    (status, Json(response)).into_response()
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 收货费用分摊 (单张收货单)
pub async fn distribute(Json(req): Json<DistributionRequest>) -> Response {
    let task = move || cost_distributor::distribute_with_summary(&req.items, &req.receiving_costs);
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => success(
            StatusCode::OK,
            format!("Distributed receiving costs over {} items", result.items.len()),
            result,
        ),
        Err(e) => failure(DocError::Storage(format!("distribution task failed: {}", e))),
    }
}

/// 收货费用分摊 (批量)
pub async fn distribute_batch(Json(reqs): Json<Vec<DistributionRequest>>) -> Response {
    let count = reqs.len();
    match tokio::task::spawn_blocking(move || cost_distributor::distribute_batch(&reqs)).await {
        Ok(results) => success(
            StatusCode::OK,
            format!("Distributed receiving costs for {} notes", count),
            results,
        ),
        Err(e) => failure(DocError::Storage(format!("distribution task failed: {}", e))),
    }
}

/// 新建单据
pub async fn create_document(
    State(service): State<AppState>,
    Json(body): Json<DocumentBody>,
) -> Response {
    match service.create(body).await {
        Ok(doc) => success(StatusCode::CREATED, format!("Created {}", doc.id), doc),
        Err(e) => failure(e),
    }
}

/// 单据列表
pub async fn list_documents(
    State(service): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Response {
    let kind = match query.kind.as_deref().filter(|k| !k.is_empty()) {
        Some(k) => match k.parse::<DocumentKind>() {
            Ok(kind) => Some(kind),
            Err(e) => return failure(DocError::Validation(e)),
        },
        None => None,
    };

    match service.list(kind).await {
        Ok(docs) => success(StatusCode::OK, format!("Found {} documents", docs.len()), docs),
        Err(e) => failure(e),
    }
}

pub async fn get_document(State(service): State<AppState>, Path(id): Path<String>) -> Response {
    match service.get(&id).await {
        Ok(doc) => success(StatusCode::OK, "OK", doc),
        Err(e) => failure(e),
    }
}

pub async fn update_document(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<DocumentBody>,
) -> Response {
    match service.update(&id, body).await {
        Ok(doc) => success(StatusCode::OK, format!("Updated {}", doc.id), doc),
        Err(e) => failure(e),
    }
}

pub async fn delete_document(State(service): State<AppState>, Path(id): Path<String>) -> Response {
    match service.delete(&id).await {
        Ok(()) => success(StatusCode::OK, format!("Deleted {}", id), id),
        Err(e) => failure(e),
    }
}

/// 导出 (csv / html / json)，以附件形式返回
pub async fn export_document(
    State(service): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Response {
    let format = match query.format.as_deref().unwrap_or("csv").parse::<ExportFormat>() {
        Ok(f) => f,
        Err(e) => return failure(e),
    };

    match service.export(&id, format).await {
        Ok(rendered) => {
            let disposition = format!("attachment; filename=\"{}\"", rendered.file_name);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, rendered.content_type.to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                rendered.bytes,
            )
                .into_response()
        }
        Err(e) => failure(e),
    }
}
