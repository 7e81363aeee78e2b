use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use novastock_api::app::{router_with, services::in_memory_services};
use novastock_core::{BranchId, ProductId};
use novastock_forecasting::{DemandPredictor, ModelArtifact};
use novastock_infra::IdentifierDirectory;
use novastock_restock::InventoryRecord;

const DEMAND_MODEL: &str = include_str!("../../../artifacts/demand_model.json");

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory stores, ephemeral port.
        let artifact = ModelArtifact::from_json_str(DEMAND_MODEL).unwrap();
        let services = in_memory_services(
            DemandPredictor::new(artifact),
            Arc::new(IdentifierDirectory::builtin()),
            vec![
                stock(1, 1, 50, 20),
                stock(2, 1, 15, 20),
                stock(1, 3, 200, 40),
                stock(2, 2, 30, 10),
            ],
        )
        .unwrap();
        let app = router_with(Arc::new(services));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn stock(product: i64, branch: i64, on_hand: u32, safety: u32) -> InventoryRecord {
    InventoryRecord {
        product_id: ProductId::new(product),
        branch_id: BranchId::new(branch),
        quantity_on_hand: on_hand,
        safety_stock: safety,
    }
}

fn scenario_a() -> serde_json::Value {
    json!({
        "price": 25.0,
        "promotion": 1,
        "branch": "Colombo",
        "product": "P0001",
        "seasonality": "Winter",
    })
}

async fn error_code(res: reqwest::Response) -> String {
    let body: serde_json::Value = res.json().await.unwrap();
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_reports_model_version() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["model_version"], "v1.0");
}

#[tokio::test]
async fn predict_records_a_forecast() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/forecasts/predict"))
        .json(&scenario_a())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["predicted_demand"], 132);
    assert_eq!(body["product_id"], 1);
    assert_eq!(body["branch_id"], 1);
    assert_eq!(body["model_version"], "v1.0");
    assert!(body["forecast_id"].as_i64().unwrap() >= 1);

    let res = client
        .get(srv.url("/forecasts?product=P0001&branch=Colombo"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let history: serde_json::Value = res.json().await.unwrap();
    assert_eq!(history["count"], 1);
    assert_eq!(history["forecasts"][0]["forecast_id"], body["forecast_id"]);
}

#[tokio::test]
async fn predict_rejects_bad_input() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let mut unknown_product = scenario_a();
    unknown_product["product"] = json!("P9999");
    let res = client
        .post(srv.url("/forecasts/predict"))
        .json(&unknown_product)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "unknown_identifier");

    let mut unseen_season = scenario_a();
    unseen_season["seasonality"] = json!("Monsoon");
    let res = client
        .post(srv.url("/forecasts/predict"))
        .json(&unseen_season)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "unknown_category");

    let mut bad_promotion = scenario_a();
    bad_promotion["promotion"] = json!(3);
    let res = client
        .post(srv.url("/forecasts/predict"))
        .json(&bad_promotion)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "validation_error");

    let res = client
        .post(srv.url("/forecasts/predict"))
        .json(&json!({ "price": 10.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "validation_error");
}

#[tokio::test]
async fn reorder_follows_latest_forecast() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/forecasts/predict"))
        .json(&scenario_a())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // 132 predicted, 50 on hand, 20 safety stock.
    let res = client
        .post(srv.url("/reorders"))
        .json(&json!({ "product": "P0001", "branch": "Colombo" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let rec: serde_json::Value = res.json().await.unwrap();
    assert_eq!(rec["predicted_demand"], 132);
    assert_eq!(rec["quantity_on_hand"], 50);
    assert_eq!(rec["safety_stock"], 20);
    assert_eq!(rec["recommended_reorder_quantity"], 102);

    let res = client
        .get(srv.url("/reorders?product=P0001&branch=Colombo"))
        .send()
        .await
        .unwrap();
    let history: serde_json::Value = res.json().await.unwrap();
    assert_eq!(history["count"], 1);
}

#[tokio::test]
async fn reorder_is_zero_when_stock_covers_demand() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    // Predicts 73 for Galle, which holds 200.
    let res = client
        .post(srv.url("/forecasts/predict"))
        .json(&json!({
            "price": 80.0,
            "promotion": 0,
            "branch": "Galle",
            "product": "P0001",
            "seasonality": "Summer",
            "date": "2024-06-01",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let forecast: serde_json::Value = res.json().await.unwrap();
    assert_eq!(forecast["predicted_demand"], 73);
    assert_eq!(forecast["forecast_date"], "2024-06-01");

    let res = client
        .post(srv.url("/reorders"))
        .json(&json!({ "product": "P0001", "branch": "Galle" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let rec: serde_json::Value = res.json().await.unwrap();
    assert_eq!(rec["recommended_reorder_quantity"], 0);
}

#[tokio::test]
async fn reorder_reports_missing_inputs() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/reorders"))
        .json(&json!({ "product": "P0002", "branch": "Kandy" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(res).await, "no_forecast");

    let mut kandy = scenario_a();
    kandy["branch"] = json!("Kandy");
    kandy["product"] = json!("P0003");
    let res = client
        .post(srv.url("/forecasts/predict"))
        .json(&kandy)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .post(srv.url("/reorders"))
        .json(&json!({ "product": "P0003", "branch": "Kandy" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(res).await, "no_inventory");

    let res = client
        .post(srv.url("/reorders"))
        .json(&json!({ "product": "P0001", "branch": "Nowhere" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "unknown_identifier");
}

#[tokio::test]
async fn alert_lifecycle_evaluate_list_acknowledge() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/alerts/evaluate"))
        .json(&json!({
            "branch_id": 1,
            "product_id": 1,
            "quantity_on_hand": 10,
            "safety_stock": 20,
            "recommended_reorder_quantity": 90,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["alert_created"], true);
    let alert = &body["alert"];
    assert_eq!(alert["type"], "LowStock");
    assert_eq!(alert["is_read"], false);
    let message = alert["message"].as_str().unwrap();
    assert!(message.contains("P0001"));
    assert!(message.contains("Colombo"));
    assert!(message.contains("90"));
    let alert_id = alert["alert_id"].as_str().unwrap().to_string();

    let res = client
        .post(srv.url("/alerts/evaluate"))
        .json(&json!({
            "branch_id": 1,
            "product_id": 1,
            "quantity_on_hand": 50,
            "safety_stock": 20,
            "recommended_reorder_quantity": 90,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["alert_created"], false);

    let res = client
        .get(srv.url("/alerts?role=branchStaff&branch_id=1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["alerts"][0]["alert_id"], alert_id.as_str());

    let res = client
        .get(srv.url("/alerts?role=branchStaff&branch_id=2"))
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed["count"], 0);

    for _ in 0..2 {
        let res = client
            .put(srv.url(&format!("/alerts/{alert_id}/read")))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let ack: serde_json::Value = res.json().await.unwrap();
        assert_eq!(ack["alert"]["is_read"], true);
    }

    let res = client
        .get(srv.url("/alerts?role=administrator"))
        .send()
        .await
        .unwrap();
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed["alerts"][0]["is_read"], true);
}

#[tokio::test]
async fn alert_access_requires_valid_role_and_branch() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    for path in ["/alerts?role=branchStaff", "/alerts?role=auditor", "/alerts"] {
        let res = client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(error_code(res).await, "invalid_access_request");
    }
}

#[tokio::test]
async fn mark_read_rejects_unknown_and_malformed_ids() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/alerts/0190b8a4-7c1e-7d2a-9f00-000000000000/read"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(res).await, "not_found");

    let res = client
        .put(srv.url("/alerts/not-a-uuid/read"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "validation_error");
}

#[tokio::test]
async fn evaluate_rejects_invalid_fields() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/alerts/evaluate"))
        .json(&json!({
            "branch_id": 1,
            "product_id": 1,
            "quantity_on_hand": -3,
            "safety_stock": 20,
            "recommended_reorder_quantity": 90,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(res).await, "validation_error");
}

#[tokio::test]
async fn branch_inventory_and_low_stock_summary() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/inventory/1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["items"][0]["product"], "P0001");
    assert_eq!(body["items"][0]["branch"], "Colombo");

    let res = client
        .get(srv.url("/inventory/1/low-stock"))
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["count"], 1);
    assert_eq!(body["items"][0]["product_id"], 2);

    let res = client.get(srv.url("/inventory/abc")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn company_wide_low_stock_summary() {
    let srv = TestServer::spawn().await;

    let res = reqwest::get(srv.url("/inventory/low-stock")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();

    // Only (P0002, Colombo) sits at or below its safety stock.
    assert_eq!(body["count"], 1);
    assert_eq!(body["items"][0]["product"], "P0002");
    assert_eq!(body["items"][0]["branch"], "Colombo");
    assert_eq!(body["items"][0]["quantity_on_hand"], 15);
}
