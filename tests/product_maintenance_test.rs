mod common;

use axum::http::{Method, StatusCode};
use common::{dec_field, json_body, TestApp};
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use serde_json::json;
use stockroom_api::entities::Product;

#[tokio::test]
async fn create_product_round_trips_and_rejects_duplicates() {
    let app = TestApp::new().await;
    let category = app.seed_category("Beverages").await;

    let response = app
        .request(
            Method::POST,
            "/new-product/",
            Some(json!({
                "name": "Sparkling Water",
                "brand": "Fizz",
                "price": "1.25",
                "barcode": "7770001112",
                "quantity_in_stock": 24,
                "category_id": category,
            })),
            None,
        )
        .await;
    let body = json_body(response, StatusCode::CREATED).await;
    let data = &body["data"];
    assert_eq!(data["name"], "Sparkling Water");
    assert_eq!(dec_field(&data["price"]), dec!(1.25));
    assert_eq!(data["quantity_in_stock"], 24);

    // Same barcode again: rejected by the advisory check.
    let response = app
        .request(
            Method::POST,
            "/new-product/",
            Some(json!({
                "name": "Impostor",
                "brand": "Fizz",
                "price": "1.25",
                "barcode": "7770001112",
                "category_id": category,
            })),
            None,
        )
        .await;
    let body = json_body(response, StatusCode::CONFLICT).await;
    assert!(body["message"]
        .as_str()
        .expect("error message")
        .contains("already exists"));

    // The rejected create left the catalog untouched.
    let products = Product::find()
        .all(&*app.state.db)
        .await
        .expect("query products");
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Sparkling Water");
}

#[tokio::test]
async fn create_product_validates_fields_and_category() {
    let app = TestApp::new().await;
    let category = app.seed_category("Snacks").await;

    // Empty name fails validation.
    let response = app
        .request(
            Method::POST,
            "/new-product/",
            Some(json!({
                "name": "",
                "brand": "Acme",
                "price": "2.00",
                "barcode": "6660001113",
                "category_id": category,
            })),
            None,
        )
        .await;
    json_body(response, StatusCode::BAD_REQUEST).await;

    // Unknown category is a 404.
    let response = app
        .request(
            Method::POST,
            "/new-product/",
            Some(json!({
                "name": "Orphan",
                "brand": "Acme",
                "price": "2.00",
                "barcode": "6660001113",
                "category_id": "00000000-0000-0000-0000-000000000000",
            })),
            None,
        )
        .await;
    json_body(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn edit_applies_only_the_provided_fields() {
    let app = TestApp::new().await;
    let category = app.seed_category("Dairy").await;
    let product = app
        .seed_product(category, "Yoghurt", "1231231231", dec!(0.99), 6)
        .await;

    let uri = format!("/product/edit/{}", product.id);

    // The form view returns the product plus the category dropdown.
    let response = app.request(Method::GET, &uri, None, None).await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["data"]["product"]["name"], "Yoghurt");
    assert_eq!(
        body["data"]["categories"].as_array().expect("cats").len(),
        1
    );

    let response = app
        .request(
            Method::POST,
            &uri,
            Some(json!({"price": "1.49", "quantity_in_stock": 8})),
            None,
        )
        .await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(dec_field(&body["data"]["price"]), dec!(1.49));
    assert_eq!(body["data"]["quantity_in_stock"], 8);
    // Untouched fields survive.
    assert_eq!(body["data"]["name"], "Yoghurt");
    assert_eq!(body["data"]["barcode"], "1231231231");

    let stored = Product::find_by_id(product.id)
        .one(&*app.state.db)
        .await
        .expect("query product")
        .expect("product exists");
    assert_eq!(stored.price, dec!(1.49));
    assert_eq!(stored.name, "Yoghurt");
}

#[tokio::test]
async fn editing_a_missing_product_is_a_404() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/product/edit/00000000-0000-0000-0000-000000000000",
            Some(json!({"price": "1.00"})),
            None,
        )
        .await;
    json_body(response, StatusCode::NOT_FOUND).await;
}

#[tokio::test]
async fn check_in_restocks_known_barcodes() {
    let app = TestApp::new().await;
    let category = app.seed_category("Produce").await;
    let product = app
        .seed_product(category, "Apples 1kg", "9090909090", dec!(3.49), 2)
        .await;

    let response = app
        .request(
            Method::POST,
            "/checkin/",
            Some(json!({"barcode": "9090909090", "quantity": 30})),
            None,
        )
        .await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["data"]["quantity_added"], 30);
    assert_eq!(body["data"]["product"]["quantity_in_stock"], 32);

    let stored = Product::find_by_id(product.id)
        .one(&*app.state.db)
        .await
        .expect("query product")
        .expect("product exists");
    assert_eq!(stored.quantity_in_stock, 32);
}

#[tokio::test]
async fn check_in_of_an_unknown_barcode_offers_the_creation_flow() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/checkin/",
            Some(json!({"barcode": "does-not-exist", "quantity": 5})),
            None,
        )
        .await;
    let body = json_body(response, StatusCode::NOT_FOUND).await;
    assert_eq!(body["unknown_product"], true);
    assert_eq!(body["barcode"], "does-not-exist");
}
