use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::Router;
use docgen_rust::{api, DocumentService, MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let store = Arc::new(MemoryStore::new());
    api::router(Arc::new(DocumentService::new(store)))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, bytes.to_vec())
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, _, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// 金额以字符串返回
fn num(v: &Value) -> f64 {
    v.as_str().unwrap().parse().unwrap()
}

fn grn_payload() -> Value {
    json!({
        "kind": "grn",
        "number": "GRN-100",
        "supplier": "Acme Supplies",
        "items": [
            {"description": "Rice", "orderedQuantity": 100, "receivedQuantity": 100, "unit": "bag", "originalUnitCost": 10},
            {"description": "Beans", "orderedQuantity": 60, "receivedQuantity": "50", "unit": "bag", "originalUnitCost": "15"}
        ],
        "receivingCosts": [
            {"description": "Transport", "amount": 120},
            {"description": "Offloading", "amount": "30"},
            {"description": "Blank line", "amount": ""}
        ]
    })
}

#[tokio::test]
async fn health() {
    let app = app();
    let (status, _, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn distribute_allocates_by_quantity() {
    let app = app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/grn/distribute",
        Some(json!({
            "items": [
                {"receivedQuantity": 100, "originalUnitCost": 10},
                {"receivedQuantity": 50, "originalUnitCost": 15}
            ],
            "receivingCosts": [{"amount": 150}]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = &body["data"];
    assert_eq!(num(&data["costPerUnit"]), 1.0);
    assert_eq!(num(&data["totalQuantity"]), 150.0);

    let items = data["items"].as_array().unwrap();
    assert_eq!(num(&items[0]["unitCost"]), 11.0);
    assert_eq!(num(&items[0]["totalWithReceivingCost"]), 1100.0);
    assert_eq!(num(&items[1]["receivingCostPerUnit"]), 1.0);
    assert_eq!(num(&items[1]["unitCost"]), 16.0);
    assert_eq!(num(&items[1]["totalWithReceivingCost"]), 800.0);
}

#[tokio::test]
async fn distribute_tolerates_empty_fields_and_zero_quantity() {
    let app = app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/grn/distribute",
        Some(json!({
            "items": [{"receivedQuantity": "", "originalUnitCost": 20}],
            "receivingCosts": [{"amount": 500}, {"description": "no amount"}]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let item = &body["data"]["items"][0];
    assert_eq!(num(&item["receivingCostPerUnit"]), 0.0);
    assert_eq!(num(&item["totalWithReceivingCost"]), 0.0);
}

#[tokio::test]
async fn distribute_treats_out_of_range_numbers_as_zero() {
    let app = app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/grn/distribute",
        Some(json!({
            "items": [{"receivedQuantity": "1e-99999999", "originalUnitCost": 1}],
            "receivingCosts": [{"amount": 10}, {"amount": "1e99999999"}]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(num(&data["totalQuantity"]), 0.0);
    assert_eq!(num(&data["totalReceivingCosts"]), 10.0);
    let item = &data["items"][0];
    assert_eq!(num(&item["receivingCostPerUnit"]), 0.0);
    assert_eq!(num(&item["totalWithReceivingCost"]), 0.0);
}

#[tokio::test]
async fn distribute_batch_handles_each_note() {
    let app = app();
    let (status, body) = send_json(
        &app,
        "POST",
        "/api/grn/distribute/batch",
        Some(json!([
            {"items": [], "receivingCosts": [{"amount": 100}]},
            {"items": [{"receivedQuantity": 10, "originalUnitCost": 5}], "receivingCosts": []}
        ])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = body["data"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0]["items"].as_array().unwrap().is_empty());
    assert_eq!(num(&results[1]["items"][0]["totalWithReceivingCost"]), 50.0);
}

#[tokio::test]
async fn document_lifecycle() {
    let app = app();

    // 新建
    let (status, body) = send_json(&app, "POST", "/api/documents", Some(grn_payload())).await;
    assert_eq!(status, StatusCode::CREATED);
    let doc = &body["data"];
    let id = doc["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("grn:"));
    assert_eq!(num(&doc["body"]["totalReceivingCosts"]), 150.0);
    assert_eq!(num(&doc["body"]["totalValue"]), 1900.0);

    // 读取
    let (status, body) = send_json(&app, "GET", &format!("/api/documents/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["body"]["number"], "GRN-100");

    // 列表
    send_json(&app, "POST", "/api/documents", Some(json!({"kind": "receipt", "number": "R-1", "amount": 40}))).await;
    let (_, body) = send_json(&app, "GET", "/api/documents?kind=grn", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (_, body) = send_json(&app, "GET", "/api/documents", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // 修改: 去掉卸货费
    let mut payload = grn_payload();
    payload["receivingCosts"] = json!([{"description": "Transport", "amount": 150}]);
    payload["number"] = json!("GRN-100A");
    let (status, body) = send_json(&app, "PUT", &format!("/api/documents/{}", id), Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["body"]["number"], "GRN-100A");
    assert_eq!(num(&body["data"]["body"]["totalReceivingCosts"]), 150.0);

    // 导出
    let (status, headers, bytes) = send(&app, "GET", &format!("/api/documents/{}/export?format=csv", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"grn-GRN-100A.csv\""
    );
    let csv = String::from_utf8(bytes).unwrap();
    assert!(csv.contains("Rice,100,100,bag,10.00,1.00,11.00,1100.00,,,"));

    let (status, headers, _) = send(&app, "GET", &format!("/api/documents/{}/export?format=html", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/html; charset=utf-8");

    // 删除
    let (status, _) = send_json(&app, "DELETE", &format!("/api/documents/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send_json(&app, "GET", &format!("/api/documents/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn bad_requests_are_rejected() {
    let app = app();

    let (status, _) = send_json(&app, "GET", "/api/documents?kind=memo", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send_json(&app, "POST", "/api/documents", Some(json!({"kind": "invoice", "number": "I-1"}))).await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = send_json(&app, "GET", &format!("/api/documents/{}/export?format=pdf", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(
        &app,
        "PUT",
        &format!("/api/documents/{}", id),
        Some(json!({"kind": "receipt"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send_json(&app, "DELETE", "/api/documents/invoice:nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
