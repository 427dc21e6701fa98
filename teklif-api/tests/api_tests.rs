use std::path::Path;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use pricing::{HistoryDocument, HistoryRecord, Offer, Product, ProductsDocument};
use serde_json::{json, Value};
use teklif_api::api::response::ApiResponse;
use teklif_api::config::Config;
use teklif_api::server::{create_app, AppState};
use tower::ServiceExt;

fn app_in(dir: &Path) -> Router {
    let mut config = Config::default();
    config.storage.data_dir = dir.to_path_buf();
    create_app(AppState::new(config))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json(method: Method, uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn with_form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn get_products(app: &Router) -> ProductsDocument {
    let (status, body) = send(app, get("/api/products")).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

async fn get_history(app: &Router) -> HistoryDocument {
    let (status, body) = send(app, get("/api/history")).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

async fn post_products(app: &Router, document: &ProductsDocument) -> Value {
    let request = with_json(Method::POST, "/api/products", serde_json::to_vec(document).unwrap());
    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

fn catalogue(names: &[&str]) -> ProductsDocument {
    let products = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut product = Product::new(i as u64 + 1, *name);
            product.offers.push(Offer::new("Firma A", 100.0 * (i as f64 + 1.0), 20.0));
            product
        })
        .collect();
    ProductsDocument::new(products)
}

#[tokio::test]
async fn products_default_to_empty_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());

    let (status, body) = send(&app, get("/api/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({ "products": [] }));
}

#[tokio::test]
async fn corrupt_files_read_as_empty_documents() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("products.json"), "{ broken").unwrap();
    std::fs::write(dir.path().join("history.json"), "[]").unwrap();
    let app = app_in(dir.path());

    assert!(get_products(&app).await.products.is_empty());
    assert!(get_history(&app).await.is_empty());
}

#[tokio::test]
async fn products_post_then_get_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());
    let document = catalogue(&["Ürün 1", "Ürün 2"]);

    assert_eq!(post_products(&app, &document).await, json!({ "success": true }));
    assert_eq!(get_products(&app).await, document);

    let on_disk = std::fs::read_to_string(dir.path().join("products.json")).unwrap();
    assert!(on_disk.contains("\"priceWithKdv\""));
    assert!(on_disk.lines().count() > 1);
}

#[tokio::test]
async fn legacy_products_document_is_stored_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());
    let legacy = json!({
        "products": [
            {
                "id": 1,
                "name": "Ürün 1",
                "note": "x",
                "offers": [
                    { "firm": "Firma A", "price": 100 },
                    { "firm": "Firma B", "price": "120", "kdvRate": 10 }
                ]
            }
        ]
    });

    let request = with_json(Method::POST, "/api/products", serde_json::to_vec(&legacy).unwrap());
    let (_, body) = send(&app, request).await;
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({ "success": true }));

    let (status, body) = send(&app, get("/api/products")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), legacy);

    let (_, body) = send(&app, get("/?selected=1")).await;
    let html = String::from_utf8(body).unwrap();
    assert!(html.contains("KDV'li (%10): 132.00 TL"));
    assert!(html.contains("KDV'siz: 100.00 TL"));
}

#[tokio::test]
async fn products_body_without_products_array_fails() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());

    for body in [json!({ "items": [] }), json!([]), json!({ "products": {} })] {
        let request = with_json(Method::POST, "/api/products", serde_json::to_vec(&body).unwrap());
        let (status, response) = send(&app, request).await;
        let response: ApiResponse<()> = serde_json::from_slice(&response).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert!(!response.success, "{}", body);
    }
    assert!(!dir.path().join("products.json").exists());
}

#[tokio::test]
async fn invalid_products_body_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());
    let document = catalogue(&["Ürün 1"]);
    post_products(&app, &document).await;

    let request = with_json(Method::POST, "/api/products", b"{ not json".to_vec());
    let (status, body) = send(&app, request).await;
    let response: ApiResponse<()> = serde_json::from_slice(&body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(!response.success);
    assert!(response.error.is_some());
    assert_eq!(get_products(&app).await, document);
}

#[tokio::test]
async fn write_failure_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();
    let app = app_in(&blocker);

    let response = post_products(&app, &catalogue(&["Ürün 1"])).await;
    assert_eq!(response["success"], false);
    assert!(response["error"].as_str().unwrap().contains("failed to write"));
}

#[tokio::test]
async fn concurrent_posts_leave_exactly_one_payload() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());
    let first = catalogue(&["Ürün 1", "Ürün 2"]);
    let second = catalogue(&["Widget"]);

    let (a, b) = tokio::join!(post_products(&app, &first), post_products(&app, &second));
    assert_eq!(a["success"], true);
    assert_eq!(b["success"], true);

    let stored = get_products(&app).await;
    assert!(stored == first || stored == second, "unexpected document: {:?}", stored);
}

#[tokio::test]
async fn history_keeps_latest_hundred_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());

    for i in 0..105 {
        let record = HistoryRecord::price_change(
            format!("Ürün {}", i),
            "Firma A",
            100.0,
            100.0 + i as f64,
            10.0,
            Utc::now(),
        );
        let request = with_json(Method::POST, "/api/history", serde_json::to_vec(&record).unwrap());
        let (_, body) = send(&app, request).await;
        assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({ "success": true }));

        let expected = (i + 1).min(100);
        if i % 25 == 0 || i >= 99 {
            assert_eq!(get_history(&app).await.len(), expected);
        }
    }

    let history = get_history(&app).await.history;
    assert_eq!(history.len(), 100);
    assert_eq!(history[0].product_name, "Ürün 104");
    assert_eq!(history[99].product_name, "Ürün 5");
}

#[tokio::test]
async fn invalid_history_record_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());

    let request = with_json(Method::POST, "/api/history", br#"{"firm":"Firma A"}"#.to_vec());
    let (_, body) = send(&app, request).await;
    let response: ApiResponse<()> = serde_json::from_slice(&body).unwrap();

    assert!(!response.success);
    assert!(get_history(&app).await.is_empty());
}

#[tokio::test]
async fn incremental_endpoints_update_products_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());

    let request = with_json(
        Method::POST,
        "/api/products/items",
        serde_json::to_vec(&json!({ "name": "Ürün 1" })).unwrap(),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let created: ApiResponse<Product> = serde_json::from_slice(&body).unwrap();
    let id = created.data.unwrap().id;
    assert_eq!(id, 1);

    let offer = json!({ "firm": "Firma A", "price": 100.0, "kdvRate": 20 });
    let request = with_json(
        Method::POST,
        &format!("/api/products/{}/offers", id),
        serde_json::to_vec(&offer).unwrap(),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    let product = serde_json::from_slice::<ApiResponse<Product>>(&body).unwrap().data.unwrap();
    assert_eq!(product.offers[0].price_with_kdv, Some(120.0));

    let edit = json!({ "firm": "Firma A", "price": 90.0, "kdvRate": 10 });
    let request = with_json(
        Method::PUT,
        &format!("/api/products/{}/offers/0", id),
        serde_json::to_vec(&edit).unwrap(),
    );
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);

    let stored = get_products(&app).await;
    assert_eq!(stored.products[0].offers[0].price_with_kdv, Some(99.0));

    let history = get_history(&app).await.history;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].old_price, 100.0);
    assert_eq!(history[0].new_price, 90.0);
    assert_eq!(history[0].price_change, -10.0);
}

#[tokio::test]
async fn incremental_endpoints_report_errors() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());
    post_products(&app, &catalogue(&["Ürün 1"])).await;

    let offer = serde_json::to_vec(&json!({ "firm": "Firma B", "price": 10.0, "kdvRate": 18 })).unwrap();
    let (status, body) = send(&app, with_json(Method::POST, "/api/products/1/offers", offer)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap()["success"], false);

    let offer = serde_json::to_vec(&json!({ "firm": "", "price": 10.0, "kdvRate": 1 })).unwrap();
    let (status, _) = send(&app, with_json(Method::POST, "/api/products/1/offers", offer)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let offer = serde_json::to_vec(&json!({ "firm": "Firma B", "price": 10.0, "kdvRate": 1 })).unwrap();
    let (status, _) = send(&app, with_json(Method::POST, "/api/products/9/offers", offer.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, with_json(Method::PUT, "/api/products/1/offers/4", offer)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert_eq!(get_products(&app).await, catalogue(&["Ürün 1"]));
}

#[tokio::test]
async fn malformed_offer_bodies_get_the_error_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());
    post_products(&app, &catalogue(&["Ürün 1"])).await;

    let bodies = [
        br#"{"firm":"Firma B","price":10}"#.to_vec(),
        br#"{"firm":"Firma B","price":"ten","kdvRate":1}"#.to_vec(),
        b"{ not json".to_vec(),
    ];
    for body in bodies {
        let (status, response) =
            send(&app, with_json(Method::POST, "/api/products/1/offers", body)).await;
        let response: ApiResponse<()> = serde_json::from_slice(&response).unwrap();

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!response.success);
        assert!(response.error.is_some());
    }

    let (status, response) = send(
        &app,
        with_json(Method::PUT, "/api/products/1/offers/0", br#"{"firm":"Firma A"}"#.to_vec()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(serde_json::from_slice::<Value>(&response).unwrap()["success"], false);

    assert_eq!(get_products(&app).await, catalogue(&["Ürün 1"]));
}

#[tokio::test]
async fn product_ids_stay_unique_after_removal() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());

    let mut document = catalogue(&["Ürün 1", "Ürün 2", "Ürün 3"]);
    document.products.remove(1);
    post_products(&app, &document).await;

    let request = with_json(
        Method::POST,
        "/api/products/items",
        serde_json::to_vec(&json!({ "name": "Ürün 4" })).unwrap(),
    );
    let (_, body) = send(&app, request).await;
    let created: ApiResponse<Product> = serde_json::from_slice(&body).unwrap();

    assert_eq!(created.data.unwrap().id, 4);
}

#[tokio::test]
async fn index_page_renders_search_and_selection() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());
    post_products(&app, &catalogue(&["Ürün 1", "Ürün 2", "Widget"])).await;

    let (status, body) = send(&app, get("/?q=%C3%BCr%C3%BCn&selected=3")).await;
    let html = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("2 ürün"));
    assert!(html.contains(r#"action="/products/3/offers""#));
    assert!(html.contains("(0 değişiklik)"));
}

#[tokio::test]
async fn form_submissions_persist_and_redirect() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());

    let response = app.clone().oneshot(with_form("/products", "name=Widget")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/?selected=1");

    let response = app
        .clone()
        .oneshot(with_form("/products/1/offers", "firm=Firma+A&price=200&kdvRate=10"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let response = app
        .clone()
        .oneshot(with_form("/products/1/offers/0", "firm=Firma+A&price=250&kdvRate=10"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let products = get_products(&app).await;
    assert_eq!(products.products[0].name, "Widget");
    assert_eq!(products.products[0].offers[0].price, 250.0);
    assert_eq!(products.products[0].offers[0].price_with_kdv, Some(275.0));
    assert_eq!(get_history(&app).await.history[0].price_change, 50.0);
}

#[tokio::test]
async fn incomplete_offer_form_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());
    post_products(&app, &catalogue(&["Ürün 1"])).await;

    let response = app
        .clone()
        .oneshot(with_form("/products/1/offers", "firm=&price=10&kdvRate=1"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(get_products(&app).await, catalogue(&["Ürün 1"]));
}

#[tokio::test]
async fn invalid_offer_edit_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());
    post_products(&app, &catalogue(&["Ürün 1"])).await;

    let response = app
        .clone()
        .oneshot(with_form("/products/1/offers/0", "firm=Firma+A&price=abc&kdvRate=10"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/?selected=1");
    assert_eq!(get_products(&app).await, catalogue(&["Ürün 1"]));
    assert!(get_history(&app).await.is_empty());
}

#[tokio::test]
async fn blank_product_form_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());

    let response = app.clone().oneshot(with_form("/products", "name=+++")).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
    assert!(get_products(&app).await.products.is_empty());
}

#[tokio::test]
async fn health_and_unknown_routes() {
    let dir = tempfile::tempdir().unwrap();
    let app = app_in(dir.path());

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({ "status": "healthy" }));

    let (status, _) = send(&app, get("/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
