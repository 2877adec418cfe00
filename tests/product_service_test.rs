mod common;

use common::TestApp;

use aradan_api::errors::ServiceError;
use aradan_api::services::products::{CreateProductInput, ImageUpload, UpdateProductInput};
use aradan_api::storage::ImageStore;
use bytes::Bytes;

fn sample_create_input() -> CreateProductInput {
    CreateProductInput {
        id: None,
        name: "Shirt".to_string(),
        price: 100,
        stock: 10,
        discount: 0,
        status: "active".to_string(),
        slug: "shirt".to_string(),
        description: "cotton".to_string(),
        category_uuid: None,
    }
}

fn sample_update_input() -> UpdateProductInput {
    UpdateProductInput {
        name: "Shirt".to_string(),
        price: 100,
        stock: 10,
        discount: 0,
        status: "active".to_string(),
        slug: "shirt".to_string(),
        description: "cotton".to_string(),
        category_uuid: None,
    }
}

fn sample_image() -> ImageUpload {
    ImageUpload {
        filename: "shirt.png".to_string(),
        bytes: Bytes::from_static(b"fake image bytes"),
    }
}

#[tokio::test]
async fn update_missing_product_is_not_found() {
    let app = TestApp::new().await;

    let result = app
        .state
        .products
        .update_product(424_242, sample_update_input(), None)
        .await;

    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn delete_missing_product_is_not_found() {
    let app = TestApp::new().await;

    let result = app.state.products.delete_product(424_242).await;
    assert!(matches!(result, Err(ServiceError::NotFound(_))));
}

#[tokio::test]
async fn create_rejects_negative_price() {
    let app = TestApp::new().await;

    let mut input = sample_create_input();
    input.price = -1;

    let result = app.state.products.create_product(input, sample_image()).await;
    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}

#[tokio::test]
async fn create_rejects_empty_name() {
    let app = TestApp::new().await;

    let mut input = sample_create_input();
    input.name = String::new();

    let result = app.state.products.create_product(input, sample_image()).await;
    assert!(matches!(result, Err(ServiceError::ValidationError(_))));
}

#[tokio::test]
async fn created_products_list_in_insertion_order() {
    let app = TestApp::new().await;

    for slug in ["first", "second", "third"] {
        let mut input = sample_create_input();
        input.slug = slug.to_string();
        app.state
            .products
            .create_product(input, sample_image())
            .await
            .expect("create failed");
    }

    let products = app.state.products.list_products().await.expect("list failed");
    let slugs: Vec<_> = products.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, ["first", "second", "third"]);
}

#[tokio::test]
async fn identical_uploads_share_a_content_key() {
    let app = TestApp::new().await;

    let first = app
        .state
        .products
        .create_product(sample_create_input(), sample_image())
        .await
        .expect("create failed");

    let mut input = sample_create_input();
    input.slug = "shirt-2".to_string();
    let second = app
        .state
        .products
        .create_product(input, sample_image())
        .await
        .expect("create failed");

    assert_eq!(first.image, second.image);
}

#[tokio::test]
async fn deleting_one_sharer_of_a_content_key_leaves_the_sibling_dangling() {
    let app = TestApp::new().await;

    let first = app
        .state
        .products
        .create_product(sample_create_input(), sample_image())
        .await
        .expect("create failed");

    let mut input = sample_create_input();
    input.slug = "shirt-2".to_string();
    let second = app
        .state
        .products
        .create_product(input, sample_image())
        .await
        .expect("create failed");

    let shared_key = first.image.clone().expect("image key set");
    assert_eq!(second.image.as_deref(), Some(shared_key.as_str()));

    // Deletes are not reference-counted: removing the first product takes
    // the shared object with it, and the second row's key dangles.
    app.state
        .products
        .delete_product(first.id)
        .await
        .expect("delete failed");

    assert!(!app.state.images.exists(&shared_key).await.unwrap());

    let survivor = app
        .state
        .products
        .get_product(second.id)
        .await
        .expect("get failed")
        .expect("second product still exists");
    assert_eq!(survivor.image.as_deref(), Some(shared_key.as_str()));

    // Re-uploading the same bytes restores the object under the same key.
    app.state
        .products
        .update_product(second.id, sample_update_input(), Some(sample_image()))
        .await
        .expect("update failed");
    assert!(app.state.images.exists(&shared_key).await.unwrap());
}
