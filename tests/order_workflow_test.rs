mod common;

use axum::http::{Method, StatusCode};
use common::{dec_field, json_body, session_cookie, TestApp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use serde_json::json;
use stockroom_api::entities::{Order, OrderDetail, Product};
use uuid::Uuid;

#[tokio::test]
async fn scanning_builds_an_order_and_decrements_stock() {
    let app = TestApp::new().await;
    let category = app.seed_category("Beverages").await;
    let product = app
        .seed_product(category, "Cola 330ml", "0123456789", dec!(2.50), 10)
        .await;

    // First contact mints a session cookie and an empty order.
    let response = app
        .request(
            Method::POST,
            "/order/",
            Some(json!({"barcode": "0123456789", "quantity": 2})),
            None,
        )
        .await;
    let cookie = session_cookie(&response).expect("first response should set the session cookie");
    let body = json_body(response, StatusCode::OK).await;
    let data = &body["data"];
    assert_eq!(data["lines"].as_array().expect("lines array").len(), 1);
    assert_eq!(data["lines"][0]["quantity"], 2);
    assert_eq!(dec_field(&data["subtotal"]), dec!(5.00));
    assert_eq!(dec_field(&data["total_with_tax"]), dec!(5.65));

    // A repeat scan accumulates on the same line rather than adding one.
    let response = app
        .request(
            Method::POST,
            "/order/",
            Some(json!({"barcode": "0123456789", "quantity": 3})),
            Some(&cookie),
        )
        .await;
    let body = json_body(response, StatusCode::OK).await;
    let data = &body["data"];
    assert_eq!(data["lines"].as_array().expect("lines array").len(), 1);
    assert_eq!(data["lines"][0]["quantity"], 5);
    assert_eq!(dec_field(&data["subtotal"]), dec!(12.50));

    let stored = Product::find_by_id(product.id)
        .one(&*app.state.db)
        .await
        .expect("query product")
        .expect("product still exists");
    assert_eq!(stored.quantity_in_stock, 5);

    // The persisted running total must equal the sum of its detail rows,
    // not just the summary recomputed at read time.
    let order_id = Uuid::parse_str(data["order_id"].as_str().expect("order id")).expect("uuid");
    let order = Order::find_by_id(order_id)
        .one(&*app.state.db)
        .await
        .expect("query order")
        .expect("order exists");
    let details = OrderDetail::find()
        .all(&*app.state.db)
        .await
        .expect("query details");
    let detail_sum: Decimal = details
        .iter()
        .filter(|d| d.order_id == order_id)
        .map(|d| d.price)
        .sum();
    assert_eq!(order.total_price, dec!(12.50));
    assert_eq!(order.total_price, detail_sum);
}

#[tokio::test]
async fn unknown_barcode_scan_is_a_404_and_leaves_the_order_untouched() {
    let app = TestApp::new().await;
    let category = app.seed_category("Snacks").await;
    app.seed_product(category, "Chips", "1112223334", dec!(1.99), 4)
        .await;

    // Establish the session and its empty active order up front.
    let response = app.request(Method::GET, "/order/", None, None).await;
    let cookie = session_cookie(&response).expect("session cookie expected");
    json_body(response, StatusCode::OK).await;

    let response = app
        .request(
            Method::POST,
            "/order/",
            Some(json!({"barcode": "no-such-code", "quantity": 1})),
            Some(&cookie),
        )
        .await;
    let body = json_body(response, StatusCode::NOT_FOUND).await;
    assert!(body["message"]
        .as_str()
        .expect("error message")
        .contains("No product found with the barcode 'no-such-code'"));

    // The failed scan still resolved an active order; it must be empty.
    let response = app.request(Method::GET, "/order/", None, Some(&cookie)).await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["data"]["lines"].as_array().expect("lines").len(), 0);
    assert_eq!(dec_field(&body["data"]["subtotal"]), dec!(0));
}

#[tokio::test]
async fn overdrawing_stock_is_rejected_with_422_and_changes_nothing() {
    let app = TestApp::new().await;
    let category = app.seed_category("Dairy").await;
    let product = app
        .seed_product(category, "Milk 1L", "5556667778", dec!(1.49), 3)
        .await;

    let response = app
        .request(
            Method::POST,
            "/order/",
            Some(json!({"barcode": "5556667778", "quantity": 4})),
            None,
        )
        .await;
    let body = json_body(response, StatusCode::UNPROCESSABLE_ENTITY).await;
    assert!(body["message"]
        .as_str()
        .expect("error message")
        .contains("Only 3 left in stock"));

    // The rejected scan rolled back: stock, totals, and detail rows are
    // untouched (the resolved order itself remains, empty).
    let stored = Product::find_by_id(product.id)
        .one(&*app.state.db)
        .await
        .expect("query product")
        .expect("product exists");
    assert_eq!(stored.quantity_in_stock, 3);

    let details = OrderDetail::find()
        .all(&*app.state.db)
        .await
        .expect("query details");
    assert!(details.is_empty());

    let orders = Order::find().all(&*app.state.db).await.expect("query orders");
    assert!(orders.iter().all(|o| o.total_price == Decimal::ZERO));
}

#[tokio::test]
async fn submit_clears_the_session_and_the_next_scan_opens_a_new_order() {
    let app = TestApp::new().await;
    let category = app.seed_category("Bakery").await;
    app.seed_product(category, "Bread", "9998887776", dec!(3.00), 20)
        .await;

    let response = app
        .request(
            Method::POST,
            "/order/",
            Some(json!({"barcode": "9998887776", "quantity": 1})),
            None,
        )
        .await;
    let cookie = session_cookie(&response).expect("session cookie expected");
    let body = json_body(response, StatusCode::OK).await;
    let first_order_id = body["data"]["order_id"]
        .as_str()
        .expect("order id")
        .to_string();

    let response = app
        .request(Method::POST, "/order/submit/", None, Some(&cookie))
        .await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["data"]["order_id"], first_order_id.as_str());

    // The slot is gone; submitting again has nothing to finalize.
    let response = app
        .request(Method::POST, "/order/submit/", None, Some(&cookie))
        .await;
    json_body(response, StatusCode::NOT_FOUND).await;

    // A fresh scan under the same session opens a brand-new order.
    let response = app
        .request(
            Method::POST,
            "/order/",
            Some(json!({"barcode": "9998887776", "quantity": 1})),
            Some(&cookie),
        )
        .await;
    let body = json_body(response, StatusCode::OK).await;
    assert_ne!(body["data"]["order_id"], first_order_id.as_str());
}

#[tokio::test]
async fn failed_scans_still_set_the_cookie_and_reuse_one_order() {
    let app = TestApp::new().await;

    // A cookie-less client whose very first scan fails must still learn its
    // session, so the order minted for it is reused instead of stranded.
    let response = app
        .request(
            Method::POST,
            "/order/",
            Some(json!({"barcode": "no-such-code", "quantity": 1})),
            None,
        )
        .await;
    let cookie =
        session_cookie(&response).expect("error response should still set the session cookie");
    json_body(response, StatusCode::NOT_FOUND).await;

    let response = app
        .request(
            Method::POST,
            "/order/",
            Some(json!({"barcode": "no-such-code", "quantity": 1})),
            Some(&cookie),
        )
        .await;
    json_body(response, StatusCode::NOT_FOUND).await;

    let orders = Order::find().all(&*app.state.db).await.expect("query orders");
    assert_eq!(orders.len(), 1, "retried failed scans must not mint new orders");
}

#[tokio::test]
async fn submit_without_a_session_slot_is_a_404() {
    let app = TestApp::new().await;

    let response = app.request(Method::POST, "/order/submit/", None, None).await;
    let body = json_body(response, StatusCode::NOT_FOUND).await;
    assert!(body["message"]
        .as_str()
        .expect("error message")
        .contains("No active order"));
}

#[tokio::test]
async fn order_list_returns_newest_first() {
    let app = TestApp::new().await;
    let category = app.seed_category("Misc").await;
    app.seed_product(category, "Widget", "4442221110", dec!(5.00), 50)
        .await;

    // Build two separate orders through two sessions.
    for _ in 0..2 {
        let response = app
            .request(
                Method::POST,
                "/order/",
                Some(json!({"barcode": "4442221110", "quantity": 1})),
                None,
            )
            .await;
        let cookie = session_cookie(&response).expect("session cookie expected");
        json_body(response, StatusCode::OK).await;
        let response = app
            .request(Method::POST, "/order/submit/", None, Some(&cookie))
            .await;
        json_body(response, StatusCode::OK).await;
    }

    let response = app.request(Method::GET, "/orders/", None, None).await;
    let body = json_body(response, StatusCode::OK).await;
    let data = &body["data"];
    assert_eq!(data["total"], 2);
    let items = data["items"].as_array().expect("items array");
    assert_eq!(items.len(), 2);
    let first = items[0]["order_date"].as_str().expect("order date");
    let second = items[1]["order_date"].as_str().expect("order date");
    assert!(first >= second, "orders should be newest first");
}
