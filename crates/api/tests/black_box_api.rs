use std::sync::Arc;

use agrimarket_api::app::{build_app, services::AppServices};
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod on a fresh in-memory store, bound to an ephemeral port.
        let app = build_app(Arc::new(AppServices::in_memory()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.get(self.url(path)).send().await.unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .request(method, self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn delete(&self, path: &str) -> (StatusCode, Value) {
        let res = self.client.delete(self.url(path)).send().await.unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn create_crop(&self, name: &str, crop_type: &str, quantity: u64) -> String {
        let (status, body) = self
            .send(reqwest::Method::POST, "/crops", crop_body(name, crop_type, quantity))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["result"]["insertedId"].as_str().unwrap().to_string()
    }

    async fn submit_interest(&self, crop_id: &str, email: &str, quantity: u64) -> (StatusCode, Value) {
        self.send(
            reqwest::Method::POST,
            "/interests",
            json!({
                "cropId": crop_id,
                "userEmail": email,
                "userName": "Buyer",
                "quantity": quantity,
                "message": "Interested",
            }),
        )
        .await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn crop_body(name: &str, crop_type: &str, quantity: u64) -> Value {
    json!({
        "name": name,
        "pricePerUnit": 42.0,
        "quantity": quantity,
        "unit": "kg",
        "type": crop_type,
        "location": "Bogura",
        "image": "https://img.example.com/crop.png",
        "description": "Fresh from the field",
        "owner": { "ownerName": "Rahim", "ownerEmail": "rahim@example.com" }
    })
}

#[tokio::test]
async fn health_and_root_respond() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Hello World!");
}

#[tokio::test]
async fn crop_lifecycle_create_read_update_delete() {
    let srv = TestServer::spawn().await;
    let id = srv.create_crop("Golden Wheat", "Wheat", 100).await;

    let (status, body) = srv.get(&format!("/crops/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["result"]["_id"], id);
    assert_eq!(body["result"]["status"], "available");
    assert_eq!(body["result"]["quantity"], 100);
    assert!(body["relatedProducts"].as_array().unwrap().is_empty());
    assert!(body["interests"].as_array().unwrap().is_empty());

    let (status, body) = srv
        .send(
            reqwest::Method::PATCH,
            &format!("/crops/{id}"),
            json!({ "pricePerUnit": 50.0, "_id": "ignored" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["_id"], id);
    assert_eq!(body["result"]["pricePerUnit"], 50.0);
    assert!(body["result"]["updatedAt"].is_string());

    let mut replacement = crop_body("Red Wheat", "Wheat", 80);
    replacement["status"] = json!("unavailable");
    let (status, body) = srv
        .send(reqwest::Method::PUT, &format!("/crops/{id}"), replacement)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["name"], "Red Wheat");
    assert_eq!(body["result"]["status"], "unavailable");

    let (status, body) = srv
        .send(
            reqwest::Method::PATCH,
            &format!("/crops/{id}/quantity"),
            json!({ "quantity": 7 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["quantity"], 7);

    let (status, _) = srv.delete(&format!("/crops/{id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = srv.get(&format!("/crops/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Crop not found");
}

#[tokio::test]
async fn malformed_ids_are_bad_requests() {
    let srv = TestServer::spawn().await;

    let (status, body) = srv.get("/crops/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, _) = srv
        .send(reqwest::Method::PATCH, "/crops/not-an-id", json!({ "name": "x" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = srv.delete("/crops/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = srv
        .send(reqwest::Method::PUT, "/interests/123", json!({ "status": "accepted" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = srv.delete("/interests/123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_bodies_are_bad_requests() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .post(srv.url("/crops"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);

    let mut missing_name = crop_body("", "Wheat", 1);
    missing_name["name"] = json!("  ");
    let (status, body) = srv.send(reqwest::Method::POST, "/crops", missing_name).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name must not be empty");
}

#[tokio::test]
async fn listing_paginates_and_searches() {
    let srv = TestServer::spawn().await;
    for i in 0..25 {
        srv.create_crop(&format!("Lot {i}"), "Grain", 1).await;
    }
    srv.create_crop("Harvest", "Wheat", 1).await;

    let (status, body) = srv.get("/crops?page=3&limit=10&category=Grain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["pagination"]["totalItems"], 25);
    assert_eq!(body["pagination"]["totalPages"], 3);
    assert_eq!(body["pagination"]["hasNextPage"], false);
    assert_eq!(body["pagination"]["hasPrevPage"], true);

    let (_, body) = srv.get("/crops?search=wheat").await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["type"], "Wheat");

    let (_, body) = srv.get("/crops/category/Wheat").await;
    assert_eq!(body["category"], "Wheat");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = srv.get("/categories").await;
    assert_eq!(body["data"], json!(["Grain", "Wheat"]));

    let (_, body) = srv.get("/locations").await;
    assert_eq!(body["data"], json!(["Bogura"]));

    let (_, body) = srv.get("/crops/owner/rahim@example.com").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 26);

    let (_, body) = srv.get("/latest-crops").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn non_numeric_page_is_rejected() {
    let srv = TestServer::spawn().await;
    let (status, body) = srv.get("/crops?page=two").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn duplicate_interest_reports_already_exists() {
    let srv = TestServer::spawn().await;
    let crop_id = srv.create_crop("Rice", "Rice", 10).await;

    let (status, body) = srv.submit_interest(&crop_id, "b@example.com", 2).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["status"], "pending");

    let (status, body) = srv.submit_interest(&crop_id, "b@example.com", 2).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["alreadyExists"], true);
    assert_eq!(body["success"], false);

    let (_, body) = srv.get(&format!("/interests/crop/{crop_id}")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn interest_in_unknown_crop_is_not_found() {
    let srv = TestServer::spawn().await;
    let crop_id = srv.create_crop("Rice", "Rice", 10).await;
    srv.delete(&format!("/crops/{crop_id}")).await;

    let (status, body) = srv.submit_interest(&crop_id, "b@example.com", 1).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Crop not found");
}

#[tokio::test]
async fn accepting_an_interest_decrements_quantity() {
    let srv = TestServer::spawn().await;
    let crop_id = srv.create_crop("Potato", "Vegetable", 10).await;
    let (_, body) = srv.submit_interest(&crop_id, "b@example.com", 4).await;
    let interest_id = body["result"]["_id"].as_str().unwrap().to_string();

    let (status, body) = srv
        .send(
            reqwest::Method::PUT,
            &format!("/interests/{interest_id}"),
            json!({ "status": "accepted" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["status"], "accepted");

    let (_, body) = srv.get(&format!("/crops/{crop_id}")).await;
    assert_eq!(body["result"]["quantity"], 6);
    assert_eq!(body["interests"][0]["status"], "accepted");

    let (_, body) = srv.get("/interests/user/b@example.com").await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["crop"]["_id"], crop_id);
}

#[tokio::test]
async fn unknown_status_is_rejected() {
    let srv = TestServer::spawn().await;
    let crop_id = srv.create_crop("Potato", "Vegetable", 10).await;
    let (_, body) = srv.submit_interest(&crop_id, "b@example.com", 4).await;
    let interest_id = body["result"]["_id"].as_str().unwrap().to_string();

    let (status, _) = srv
        .send(
            reqwest::Method::PUT,
            &format!("/interests/{interest_id}"),
            json!({ "status": "approved" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_a_crop_cascades_to_interests() {
    let srv = TestServer::spawn().await;
    let crop_id = srv.create_crop("Mango", "Fruit", 10).await;
    srv.submit_interest(&crop_id, "a@example.com", 1).await;
    srv.submit_interest(&crop_id, "b@example.com", 1).await;

    let (status, body) = srv.delete(&format!("/crops/{crop_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedInterests"], 2);

    let (status, body) = srv.get(&format!("/interests/crop/{crop_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_an_interest() {
    let srv = TestServer::spawn().await;
    let crop_id = srv.create_crop("Mango", "Fruit", 10).await;
    let (_, body) = srv.submit_interest(&crop_id, "a@example.com", 1).await;
    let interest_id = body["result"]["_id"].as_str().unwrap().to_string();

    let (status, body) = srv.delete(&format!("/interests/{interest_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = srv.delete(&format!("/interests/{interest_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Interest not found");
}
