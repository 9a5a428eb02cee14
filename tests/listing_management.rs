mod helpers;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use bazaar_client::error::AppError;
use bazaar_client::infrastructure::listings::{
    HttpListingsClient, ListingDraft, ListingManagementGateway, ListingUpdate,
};
use helpers::spawn_stub;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use serde_json::json;

const TOKEN: &str = "token-123";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

fn unauthorized() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": "Authorization header is missing or invalid."})),
    )
}

fn wire_listing(id: i64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "price": "9.99",
        "tags": ["tools"],
        "images": [],
        "user_id": "user-1",
        "description": "a fine tool",
        "stock": 3
    })
}

/// Stub listings backend covering the owner-scoped management routes
fn listings_stub() -> Router {
    Router::new()
        .route(
            "/api/me/listings",
            get(|headers: HeaderMap| async move {
                if !authorized(&headers) {
                    return unauthorized();
                }
                (
                    StatusCode::OK,
                    Json(json!([wire_listing(1, "Hammer"), wire_listing(2, "Saw")])),
                )
            }),
        )
        .route(
            "/api/listings",
            post(
                |headers: HeaderMap, Json(body): Json<serde_json::Value>| async move {
                    if !authorized(&headers) {
                        return unauthorized();
                    }
                    let mut created = body.clone();
                    created["id"] = json!(7);
                    created["user_id"] = json!("user-1");
                    (StatusCode::CREATED, Json(created))
                },
            ),
        )
        .route(
            "/api/listings/:id",
            get(|Path(id): Path<i64>, headers: HeaderMap| async move {
                if !authorized(&headers) {
                    return unauthorized();
                }
                (StatusCode::OK, Json(wire_listing(id, "Hammer")))
            })
            .put(
                |Path(id): Path<i64>,
                 headers: HeaderMap,
                 Json(update): Json<serde_json::Value>| async move {
                    if !authorized(&headers) {
                        return unauthorized();
                    }
                    let mut listing = wire_listing(id, "Hammer");
                    if let Some(fields) = update.as_object() {
                        for (key, value) in fields {
                            listing[key.as_str()] = value.clone();
                        }
                    }
                    (StatusCode::OK, Json(listing))
                },
            )
            .delete(|Path(_id): Path<i64>, headers: HeaderMap| async move {
                if !authorized(&headers) {
                    return unauthorized();
                }
                (
                    StatusCode::OK,
                    Json(json!({"message": "Listing deleted successfully."})),
                )
            }),
        )
}

fn price(raw: &str) -> Decimal {
    raw.parse().expect("invalid test price")
}

#[tokio::test]
async fn it_should_list_the_owners_listings() {
    let base_url = spawn_stub(listings_stub()).await;
    let client = HttpListingsClient::new(base_url, false);

    let listings = client.my_listings(TOKEN).await.unwrap();
    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].name, "Hammer");
    assert_eq!(listings[1].name, "Saw");
    assert_eq!(listings[0].owner_id.as_deref(), Some("user-1"));
}

#[tokio::test]
async fn it_should_reject_management_calls_without_a_valid_token() {
    let base_url = spawn_stub(listings_stub()).await;
    let client = HttpListingsClient::new(base_url, false);

    let err = client.my_listings("stale-token").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthorized(_)));
}

#[tokio::test]
async fn it_should_create_a_listing_with_the_session_token() {
    let base_url = spawn_stub(listings_stub()).await;
    let client = HttpListingsClient::new(base_url, false);

    let draft = ListingDraft {
        name: "Chisel".to_string(),
        price: price("14.25"),
        tags: vec!["tools".to_string()],
        images: vec!["https://img.example.com/chisel.jpg".to_string()],
        description: "sharp".to_string(),
        stock: 5,
    };
    let created = client.create_listing(TOKEN, &draft).await.unwrap();

    assert_eq!(created.id, 7);
    assert_eq!(created.name, "Chisel");
    assert_eq!(created.unit_price, price("14.25"));
    assert_eq!(created.owner_id.as_deref(), Some("user-1"));
}

#[tokio::test]
async fn it_should_fetch_a_single_listing_for_the_profile_view() {
    let base_url = spawn_stub(listings_stub()).await;
    let client = HttpListingsClient::new(base_url, false);

    let listing = client.fetch_listing(TOKEN, 42).await.unwrap();
    assert_eq!(listing.id, 42);
    assert_eq!(listing.name, "Hammer");
    assert_eq!(listing.unit_price, price("9.99"));
}

#[tokio::test]
async fn it_should_send_only_the_changed_fields_on_update() {
    let base_url = spawn_stub(listings_stub()).await;
    let client = HttpListingsClient::new(base_url, false);

    let update = ListingUpdate {
        name: Some("Sledgehammer".to_string()),
        ..Default::default()
    };
    let updated = client.update_listing(TOKEN, 1, &update).await.unwrap();

    assert_eq!(updated.name, "Sledgehammer");
    // untouched fields keep their stored values
    assert_eq!(updated.stock, Some(3));
    assert_eq!(updated.unit_price, price("9.99"));
}

#[tokio::test]
async fn it_should_delete_a_listing() {
    let base_url = spawn_stub(listings_stub()).await;
    let client = HttpListingsClient::new(base_url, false);

    client.delete_listing(TOKEN, 1).await.unwrap();
}
