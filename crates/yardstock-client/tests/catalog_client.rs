//! Integration tests for `CatalogClient` and `BatchSubmitter`.
//!
//! Each test stands up a local `wiremock` server, so no real network traffic
//! is made.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use yardstock_bulk::{normalize_draft, PreviewRegistry};
use yardstock_client::{BatchSubmitter, CatalogClient, ClientError, ProductPayload, SubmitError};
use yardstock_core::{ProductDraft, RawRow, UploadedFile, VendorProfile};

/// No retries, no token.
fn test_client(base: &str) -> CatalogClient {
    CatalogClient::new(base, 5, "yardstock-test/0.1", 0, 0, None)
        .expect("failed to build test CatalogClient")
}

fn test_client_with(base: &str, max_retries: u32, token: Option<&str>) -> CatalogClient {
    CatalogClient::new(
        base,
        5,
        "yardstock-test/0.1",
        max_retries,
        0,
        token.map(str::to_owned),
    )
    .expect("failed to build test CatalogClient")
}

fn vendor() -> VendorProfile {
    VendorProfile {
        vendor_id: "6650f1c2a1b2c3d4e5f60718".to_owned(),
        id_number: "RC-1029384".to_owned(),
        display_name: Some("Adire House Textiles".to_owned()),
    }
}

fn draft(name: &str) -> ProductDraft {
    let row = RawRow {
        name: name.to_owned(),
        price_per_yard: "1500".to_owned(),
        quantity: "10".to_owned(),
        ..RawRow::default()
    };
    normalize_draft(row, Vec::new()).draft
}

fn payload(name: &str) -> ProductPayload {
    ProductPayload {
        name: name.to_owned(),
        price_per_yard: "1500".parse().expect("decimal"),
        quantity: 10,
        material_type: "Cotton".to_owned(),
        vendor_id: "v1".to_owned(),
        id_number: "RC-1".to_owned(),
        description: String::new(),
        pattern: "Plain".to_owned(),
        status: true,
        images: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// CatalogClient
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bulk_create_posts_products_field_and_parses_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/products/bulk"))
        .and(body_string_contains("name=\"products\""))
        .and(body_string_contains("\"pricePerYard\":1500"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "createdCount": 1,
            "errorCount": 0,
            "errors": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client(&server.uri())
        .bulk_create(&[payload("Cotton")], &[])
        .await
        .expect("bulk create should succeed");

    assert!(response.success);
    assert_eq!(response.created_count, 1);
}

#[tokio::test]
async fn bulk_create_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/products/bulk"))
        .and(header("authorization", "Bearer s3cret"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "createdCount": 1})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = test_client_with(&server.uri(), 0, Some("s3cret"))
        .bulk_create(&[payload("Cotton")], &[])
        .await;
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
}

#[tokio::test]
async fn bulk_create_maps_401_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/products/bulk"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .bulk_create(&[payload("Cotton")], &[])
        .await
        .unwrap_err();
    assert!(
        matches!(err, ClientError::Unauthorized { status: 401 }),
        "expected Unauthorized, got: {err:?}"
    );
}

#[tokio::test]
async fn bulk_create_retries_after_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/products/bulk"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/products/bulk"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "createdCount": 1})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = test_client_with(&server.uri(), 2, None)
        .bulk_create(&[payload("Cotton")], &[])
        .await
        .expect("should succeed after one retry");
    assert_eq!(response.created_count, 1);
}

#[tokio::test]
async fn bulk_create_does_not_retry_server_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/products/bulk"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let err = test_client_with(&server.uri(), 3, None)
        .bulk_create(&[payload("Cotton")], &[])
        .await
        .unwrap_err();
    assert!(
        matches!(err, ClientError::UnexpectedStatus { status: 500, ref body, .. } if body == "boom"),
        "expected UnexpectedStatus, got: {err:?}"
    );
}

#[tokio::test]
async fn bulk_create_returns_item_report_from_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/products/bulk"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "createdCount": 0,
            "errorCount": 1,
            "errors": [{"index": 0, "error": "duplicate name"}]
        })))
        .mount(&server)
        .await;

    let response = test_client(&server.uri())
        .bulk_create(&[payload("Cotton")], &[])
        .await
        .expect("item report should be returned");
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].error, "duplicate name");
}

#[tokio::test]
async fn bulk_create_rejects_malformed_success_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/products/bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .bulk_create(&[payload("Cotton")], &[])
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Deserialize { .. }));
}

// ---------------------------------------------------------------------------
// BatchSubmitter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn submitter_sends_image_parts_per_product() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/products/bulk"))
        .and(body_string_contains("name=\"images[0]\""))
        .and(body_string_contains("filename=\"cotton.jpg\""))
        .and(body_string_contains("\"vendorId\":\"6650f1c2a1b2c3d4e5f60718\""))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "createdCount": 2,
            "errorCount": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut previews = PreviewRegistry::new();
    let mut cotton = draft("Cotton");
    cotton.images.push(previews.attach(Arc::new(UploadedFile::new(
        "cotton.jpg",
        b"jpeg bytes".to_vec(),
    ))));
    let silk = draft("Silk");

    let submitter = BatchSubmitter::new(test_client(&server.uri()), vendor());
    let outcome = submitter.submit(&[cotton, silk]).await.expect("submit");

    assert_eq!(outcome.created_count, 2);
    assert!(outcome.is_complete());
}

#[tokio::test]
async fn submitter_reports_partial_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/products/bulk"))
        .respond_with(ResponseTemplate::new(207).set_body_json(json!({
            "success": false,
            "createdCount": 1,
            "errorCount": 1,
            "errors": [{"index": 1, "error": "duplicate name"}]
        })))
        .mount(&server)
        .await;

    let submitter = BatchSubmitter::new(test_client(&server.uri()), vendor());
    let outcome = submitter
        .submit(&[draft("Cotton"), draft("Silk")])
        .await
        .expect("partial failure is not an error");

    assert_eq!(outcome.created_count, 1);
    assert_eq!(outcome.error_count, 1);
    assert_eq!(outcome.errors[0].index, 1);
}

#[tokio::test]
async fn submitter_aggregates_total_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/products/bulk"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "createdCount": 0,
            "errorCount": 2,
            "errors": [
                {"index": 0, "error": "duplicate name"},
                {"index": 1, "error": "duplicate name"}
            ]
        })))
        .mount(&server)
        .await;

    let submitter = BatchSubmitter::new(test_client(&server.uri()), vendor());
    let err = submitter
        .submit(&[draft("Cotton"), draft("Silk")])
        .await
        .unwrap_err();

    assert!(matches!(err, SubmitError::AllFailed { count: 2, .. }));
    assert!(err.to_string().starts_with("All 2 products failed"));
}

#[tokio::test]
async fn submitter_sends_nothing_when_a_draft_is_invalid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut broken = draft("Silk");
    broken.price_input = "free".to_owned();

    let submitter = BatchSubmitter::new(test_client(&server.uri()), vendor());
    let err = submitter
        .submit(&[draft("Cotton"), broken])
        .await
        .unwrap_err();

    assert_eq!(
        err.messages(),
        vec!["Product 2: Price: Price must be a valid positive number"]
    );
}
