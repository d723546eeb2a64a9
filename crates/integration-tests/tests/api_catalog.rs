//! Catalog API against a running storefront.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database (jb-cli migrate)
//! - The storefront running (cargo run -p jewelbox-storefront)
//! - An admin account in `JB_ADMIN_EMAIL` / `JB_ADMIN_PASSWORD`

use jewelbox_integration_tests::{admin, api, client, create_product, customer};
use reqwest::StatusCode;
use serde_json::{Value, json};
use uuid::Uuid;

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_product_list_is_public() {
    let resp = client()
        .get(api("/products"))
        .send()
        .await
        .expect("Failed to list products");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_unknown_product_is_not_found() {
    let resp = client()
        .get(api("/products/999999999"))
        .send()
        .await
        .expect("Failed to get product");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["message"], "Product not found");
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_product_crud_as_admin() {
    let admin = admin().await;
    let name = format!("Test Ring {}", Uuid::new_v4().simple());
    let product = create_product(&admin, &name, "120.00", 3).await;
    let id = &product["id"];

    assert_eq!(product["name"], name.as_str());
    assert_eq!(product["stock"], 3);
    assert_eq!(product["isCustomPackagingAvailable"], true);

    // Keyword search finds it
    let found: Value = client()
        .get(api("/products"))
        .query(&[("keyword", name.as_str())])
        .send()
        .await
        .expect("Failed to search")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(found.as_array().map(Vec::len), Some(1));

    // Partial update keeps untouched fields
    let form = reqwest::multipart::Form::new().text("stock", "7");
    let updated: Value = admin
        .put(api(&format!("/products/{id}")))
        .multipart(form)
        .send()
        .await
        .expect("Failed to update")
        .json()
        .await
        .expect("Invalid JSON");
    assert_eq!(updated["stock"], 7);
    assert_eq!(updated["name"], name.as_str());

    let resp = admin
        .delete(api(&format!("/products/{id}")))
        .send()
        .await
        .expect("Failed to delete");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client()
        .get(api(&format!("/products/{id}")))
        .send()
        .await
        .expect("Failed to get product");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_customer_cannot_manage_catalog() {
    let (customer, _) = customer().await;

    let resp = customer
        .post(api("/packaging"))
        .json(&json!({ "type": "box", "name": "Sneaky" }))
        .send()
        .await
        .expect("Failed to post packaging");

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["message"], "Not authorized as an admin");
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_packaging_crud_as_admin() {
    let admin = admin().await;
    let name = format!("Ribbon {}", Uuid::new_v4().simple());

    let resp = admin
        .post(api("/packaging"))
        .json(&json!({ "type": "ribbon", "name": name, "price": "1.25", "colorCode": "#d4af37" }))
        .send()
        .await
        .expect("Failed to create option");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let option: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(option["type"], "ribbon");

    let listed: Value = client()
        .get(api("/packaging"))
        .send()
        .await
        .expect("Failed to list packaging")
        .json()
        .await
        .expect("Invalid JSON");
    assert!(
        listed
            .as_array()
            .is_some_and(|options| options.iter().any(|o| o["name"] == name.as_str()))
    );

    let resp = admin
        .delete(api(&format!("/packaging/{}", option["id"])))
        .send()
        .await
        .expect("Failed to delete option");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_marquee_update_is_partial() {
    let admin = admin().await;

    let before: Value = client()
        .get(api("/marquee"))
        .send()
        .await
        .expect("Failed to get marquee")
        .json()
        .await
        .expect("Invalid JSON");

    let after: Value = admin
        .put(api("/marquee"))
        .json(&json!({ "isActive": true }))
        .send()
        .await
        .expect("Failed to update marquee")
        .json()
        .await
        .expect("Invalid JSON");

    assert_eq!(after["isActive"], true);
    assert_eq!(after["text"], before["text"]);
    assert_eq!(after["bgColor"], before["bgColor"]);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_hero_requires_image() {
    let admin = admin().await;
    let form = reqwest::multipart::Form::new()
        .text("heading", "Spring")
        .text("subHeading", "New season")
        .text("productCode", "SP-1");

    let resp = admin
        .post(api("/hero"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to post slide");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["message"], "image is required");
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_non_image_upload_is_rejected() {
    let admin = admin().await;
    let name = format!("Bad Upload {}", Uuid::new_v4().simple());
    let part = reqwest::multipart::Part::bytes(b"not an image".to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")
        .expect("valid mime");
    let form = reqwest::multipart::Form::new()
        .text("name", name)
        .text("description", "x")
        .text("price", "10")
        .part("images", part);

    let resp = admin
        .post(api("/products"))
        .multipart(form)
        .send()
        .await
        .expect("Failed to post product");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["message"], "Images only!");
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_duplicate_category_name_is_rejected() {
    let admin = admin().await;
    let name = format!("Anklets {}", Uuid::new_v4().simple());
    let form = || reqwest::multipart::Form::new().text("name", name.clone());

    let resp = admin
        .post(api("/categories"))
        .multipart(form())
        .send()
        .await
        .expect("Failed to create category");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let category: Value = resp.json().await.expect("Invalid JSON");

    let resp = admin
        .post(api("/categories"))
        .multipart(form())
        .send()
        .await
        .expect("Failed to post duplicate");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Invalid JSON");
    assert_eq!(body["message"], "Category already exists");

    let listed: Value = client()
        .get(api("/categories"))
        .send()
        .await
        .expect("Failed to list categories")
        .json()
        .await
        .expect("Invalid JSON");
    let matching = listed
        .as_array()
        .map_or(0, |all| all.iter().filter(|c| c["name"] == name.as_str()).count());
    assert_eq!(matching, 1);

    let resp = admin
        .delete(api(&format!("/categories/{}", category["id"])))
        .send()
        .await
        .expect("Failed to delete category");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_prices_beyond_whole_cents_are_rejected() {
    let admin = admin().await;

    for price in ["123456789012345.678", "1.239"] {
        let form = reqwest::multipart::Form::new()
            .text("name", format!("Overpriced {}", Uuid::new_v4().simple()))
            .text("description", "Integration test piece")
            .text("price", price);
        let resp = admin
            .post(api("/products"))
            .multipart(form)
            .send()
            .await
            .expect("Failed to post product");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{price}");
    }

    let resp = admin
        .post(api("/packaging"))
        .json(&json!({ "type": "box", "name": "Sub-cent", "price": "0.005" }))
        .send()
        .await
        .expect("Failed to post packaging");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
