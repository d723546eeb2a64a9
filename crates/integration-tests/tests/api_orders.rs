//! Checkout and order API against a running storefront.
//!
//! Requires the same setup as `api_catalog.rs`.

use jewelbox_integration_tests::{
    admin, api, client, create_product, customer, delete_product, shipping_address,
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

fn name(prefix: &str) -> String {
    format!("{prefix} {}", Uuid::new_v4().simple())
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_checkout_requires_sign_in() {
    let resp = client()
        .post(api("/orders"))
        .json(&json!({ "orderItems": [{ "product": 1, "qty": 1 }] }))
        .send()
        .await
        .expect("Failed to post order");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_checkout_decrements_stock_and_prices_server_side() {
    let admin = admin().await;
    let product = create_product(&admin, &name("Pearl Drop"), "50.00", 2).await;
    let id = product["id"].clone();
    let (customer, profile) = customer().await;

    let resp = customer
        .post(api("/orders"))
        .json(&json!({
            "orderItems": [{ "product": id, "qty": 2, "price": "0.01" }],
            "shippingAddress": shipping_address(),
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let order: Value = resp.json().await.expect("Invalid JSON");

    assert_eq!(order["user"]["id"], profile["id"]);
    assert_eq!(order["isPaid"], false);
    assert_eq!(order["isDelivered"], false);
    assert_eq!(order["orderItems"][0]["qty"], 2);

    let after: Value = client()
        .get(api(&format!("/products/{id}")))
        .send()
        .await
        .expect("Failed to get product")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(after["stock"], 0);

    // Listed under the customer's own orders
    let mine: Value = customer
        .get(api("/orders/myorders"))
        .send()
        .await
        .expect("Failed to list orders")
        .json()
        .await
        .expect("Invalid JSON");
    assert!(
        mine.as_array()
            .is_some_and(|orders| orders.iter().any(|o| o["id"] == order["id"]))
    );

    delete_product(&admin, &id).await;
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_oversell_is_rejected_without_side_effects() {
    let admin = admin().await;
    let product = create_product(&admin, &name("Opal Band"), "80.00", 1).await;
    let id = product["id"].clone();
    let (customer, _) = customer().await;

    let resp = customer
        .post(api("/orders"))
        .json(&json!({
            "orderItems": [{ "product": id, "qty": 2 }],
            "shippingAddress": shipping_address(),
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let after: Value = client()
        .get(api(&format!("/products/{id}")))
        .send()
        .await
        .expect("Failed to get product")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(after["stock"], 1);

    let mine: Value = customer
        .get(api("/orders/myorders"))
        .send()
        .await
        .expect("Failed to list orders")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(mine.as_array().map(Vec::len), Some(0));

    delete_product(&admin, &id).await;
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_missing_address_is_rejected() {
    let admin = admin().await;
    let product = create_product(&admin, &name("Ruby Stud"), "30.00", 5).await;
    let id = product["id"].clone();
    let (customer, _) = customer().await;

    let resp = customer
        .post(api("/orders"))
        .json(&json!({ "orderItems": [{ "product": id, "qty": 1 }] }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    delete_product(&admin, &id).await;
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_other_customers_cannot_view_order() {
    let admin = admin().await;
    let product = create_product(&admin, &name("Jade Pendant"), "45.00", 3).await;
    let id = product["id"].clone();
    let (owner, _) = customer().await;
    let (stranger, _) = customer().await;

    let order: Value = owner
        .post(api("/orders"))
        .json(&json!({
            "orderItems": [{ "product": id, "qty": 1 }],
            "shippingAddress": shipping_address(),
        }))
        .send()
        .await
        .expect("Failed to place order")
        .json()
        .await
        .expect("Invalid JSON");
    let order_url = api(&format!("/orders/{}", order["id"]));

    let resp = stranger.get(&order_url).send().await.expect("Failed to get order");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = owner.get(&order_url).send().await.expect("Failed to get order");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = admin.get(&order_url).send().await.expect("Failed to get order");
    assert_eq!(resp.status(), StatusCode::OK);

    delete_product(&admin, &id).await;
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_mark_delivered_keeps_first_timestamp() {
    let admin = admin().await;
    let product = create_product(&admin, &name("Topaz Cuff"), "60.00", 2).await;
    let id = product["id"].clone();
    let (customer, _) = customer().await;

    let order: Value = customer
        .post(api("/orders"))
        .json(&json!({
            "orderItems": [{ "product": id, "qty": 1 }],
            "shippingAddress": shipping_address(),
        }))
        .send()
        .await
        .expect("Failed to place order")
        .json()
        .await
        .expect("Invalid JSON");
    let deliver_url = api(&format!("/orders/{}/deliver", order["id"]));

    let resp = customer.put(&deliver_url).send().await.expect("Failed to deliver");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let first: Value = admin
        .put(&deliver_url)
        .send()
        .await
        .expect("Failed to deliver")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(first["isDelivered"], true);

    let second: Value = admin
        .put(&deliver_url)
        .send()
        .await
        .expect("Failed to deliver")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(second["deliveredAt"], first["deliveredAt"]);

    delete_product(&admin, &id).await;
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_product_edit_without_stock_keeps_checkout_decrement() {
    let admin = admin().await;
    let product = create_product(&admin, &name("Ruby Band"), "80.00", 5).await;
    let id = product["id"].clone();
    let (customer, _) = customer().await;

    let resp = customer
        .post(api("/orders"))
        .json(&json!({
            "orderItems": [{ "product": id, "qty": 2 }],
            "shippingAddress": shipping_address(),
        }))
        .send()
        .await
        .expect("Failed to place order");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let form = reqwest::multipart::Form::new().text("name", name("Ruby Band II"));
    let updated: Value = admin
        .put(api(&format!("/products/{id}")))
        .multipart(form)
        .send()
        .await
        .expect("Failed to update product")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(updated["stock"], 3);

    delete_product(&admin, &id).await;
}
