//! REST API integration tests against a live server.

mod common;

use autovault::models::{CarsResponse, Listing, MessageResponse};
use common::{new_listing_body, spawn_app};
use reqwest::StatusCode;

async fn search(app: &common::TestApp, query: &str) -> CarsResponse {
    let resp = app.client.get(app.url(&format!("/api/cars{}", query))).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

fn titles(response: &CarsResponse) -> Vec<&str> {
    response.cars.iter().map(|c| c.title.as_str()).collect()
}

#[tokio::test]
async fn list_returns_all_cars_with_facets() {
    let app = spawn_app().await;
    let data = search(&app, "").await;
    assert_eq!(data.cars.len(), 5);
    assert_eq!(data.filters.makes.len(), 5);
    assert_eq!(data.filters.makes[0].value, "Mercedes-Benz");
    assert!(data.filters.fuel_types.iter().all(|f| f.count == 1));
}

#[tokio::test]
async fn fuel_type_filter_narrows_cars_and_facets() {
    let app = spawn_app().await;
    let data = search(&app, "?fuelType=Electric").await;
    assert_eq!(titles(&data), ["Tesla Model S 2023"]);
    assert_eq!(data.filters.fuel_types.len(), 1);
    assert_eq!(data.filters.fuel_types[0].value, "Electric");
    assert_eq!(data.filters.fuel_types[0].count, 1);
}

#[tokio::test]
async fn price_bounds_are_inclusive_and_accept_camel_case_aliases() {
    let app = spawn_app().await;
    let data = search(&app, "?minprice=60000&maxprice=70000").await;
    assert_eq!(titles(&data), ["Mercedes-Benz E-Class 2023"]);

    let data = search(&app, "?minPrice=89900&maxPrice=95000").await;
    assert_eq!(titles(&data), ["BMW 7 Series 2023", "Tesla Model S 2023"]);
}

#[tokio::test]
async fn multi_valued_keys_accept_commas_and_repeats() {
    let app = spawn_app().await;
    let joined = search(&app, "?make=BMW%2CTesla").await;
    let repeated = search(&app, "?make=BMW&make=tesla").await;
    assert_eq!(titles(&joined), ["BMW 7 Series 2023", "Tesla Model S 2023"]);
    assert_eq!(titles(&joined), titles(&repeated));
}

#[tokio::test]
async fn unknown_id_is_404_with_message() {
    let app = spawn_app().await;
    let resp = app.client.get(app.url("/api/cars/nope")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: MessageResponse = resp.json().await.unwrap();
    assert_eq!(body.message, "Car not found");
}

#[tokio::test]
async fn create_then_fetch_listing() {
    let app = spawn_app().await;
    let resp = app.client.post(app.url("/api/cars")).json(&new_listing_body()).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Listing = resp.json().await.unwrap();
    assert_eq!(created.id.len(), 32);
    assert!(created.is_available());
    assert!(created.created_at.is_some());

    let fetched: Listing = app
        .client
        .get(app.url(&format!("/api/cars/{}", created.id)))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn create_rejects_invalid_bodies() {
    let app = spawn_app().await;

    let mut no_images = new_listing_body();
    no_images["images"] = serde_json::json!([]);
    let resp = app.client.post(app.url("/api/cars")).json(&no_images).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: MessageResponse = resp.json().await.unwrap();
    assert!(body.message.contains("images"));

    let mut bad_fuel = new_listing_body();
    bad_fuel["fuelType"] = serde_json::json!("Steam");
    let resp = app.client.post(app.url("/api/cars")).json(&bad_fuel).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.store.list().await.unwrap().len(), 5);
}

#[tokio::test]
async fn patch_updates_fields_and_revalidates() {
    let app = spawn_app().await;
    let resp = app
        .client
        .patch(app.url("/api/cars/3"))
        .json(&serde_json::json!({ "price": 85000, "title": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Listing = resp.json().await.unwrap();
    assert_eq!(updated.price, 85000);
    assert_eq!(updated.title, "Tesla Model S 2023");
    assert!(updated.updated_at.is_some());

    let resp = app
        .client
        .patch(app.url("/api/cars/3"))
        .json(&serde_json::json!({ "seats": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = app.client.patch(app.url("/api/cars/404")).json(&serde_json::json!({})).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_listing_once() {
    let app = spawn_app().await;
    let resp = app.client.delete(app.url("/api/cars/5")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: MessageResponse = resp.json().await.unwrap();
    assert_eq!(body.message, "Car deleted successfully");

    let resp = app.client.delete(app.url("/api/cars/5")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(search(&app, "").await.cars.len(), 4);
}

#[tokio::test]
async fn similar_lists_same_make_within_price_band() {
    let app = spawn_app().await;
    let similar: Vec<Listing> =
        app.client.get(app.url("/api/cars/1/similar")).send().await.unwrap().json().await.unwrap();
    assert!(similar.is_empty());

    app.client.post(app.url("/api/cars")).json(&new_listing_body()).send().await.unwrap();
    let similar: Vec<Listing> =
        app.client.get(app.url("/api/cars/1/similar")).send().await.unwrap().json().await.unwrap();
    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].model, "C-Class");
}

#[tokio::test]
async fn cors_allows_any_origin() {
    let app = spawn_app().await;
    let resp = app
        .client
        .get(app.url("/api/cars"))
        .header("Origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}
