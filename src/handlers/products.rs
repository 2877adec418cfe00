use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::fmt::Display;
use std::str::FromStr;
use tracing::instrument;
use utoipa::ToSchema;

use crate::entities::product::Model as Product;
use crate::errors::ServiceError;
use crate::handlers::AppState;
use crate::repositories::ProductWithCategory;
use crate::services::products::{CreateProductInput, ImageUpload, UpdateProductInput};

/// Envelope for the product listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
}

/// Envelope for a single product lookup. `products` is null when the id
/// does not exist; the endpoint still answers 200.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductShowResponse {
    pub products: Option<Product>,
}

/// Confirmation payload for a successful delete.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

/// Multipart fields accumulated while draining a product request body.
#[derive(Default)]
struct ProductForm {
    id: Option<i64>,
    name: Option<String>,
    price: Option<i32>,
    stock: Option<i32>,
    discount: Option<i32>,
    status: Option<String>,
    slug: Option<String>,
    description: Option<String>,
    category_uuid: Option<String>,
    image: Option<ImageUpload>,
}

fn parse_int<T>(field: &str, raw: &str) -> Result<T, ServiceError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| ServiceError::ValidationError(format!("Field '{field}' must be an integer: {e}")))
}

fn required<T>(field: &str, value: Option<T>) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::ValidationError(format!("Missing required field '{field}'")))
}

async fn parse_product_form(mut multipart: Multipart) -> Result<ProductForm, ServiceError> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::ValidationError(format!("Multipart error: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let filename = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await.map_err(|e| {
                ServiceError::ValidationError(format!("Failed to read image field: {e}"))
            })?;
            form.image = Some(ImageUpload { filename, bytes });
            continue;
        }

        let text = field.text().await.map_err(|e| {
            ServiceError::ValidationError(format!("Failed to read field '{name}': {e}"))
        })?;

        match name.as_str() {
            "id" => form.id = Some(parse_int("id", &text)?),
            "name" => form.name = Some(text),
            "price" => form.price = Some(parse_int("price", &text)?),
            "stock" => form.stock = Some(parse_int("stock", &text)?),
            "discount" => form.discount = Some(parse_int("discount", &text)?),
            "status" => form.status = Some(text),
            "slug" => form.slug = Some(text),
            "description" => form.description = Some(text),
            "category_uuid" => form.category_uuid = Some(text),
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(form)
}

impl ProductForm {
    fn into_create_input(self) -> Result<(CreateProductInput, ImageUpload), ServiceError> {
        let image = required("image", self.image)?;
        let input = CreateProductInput {
            id: self.id,
            name: required("name", self.name)?,
            price: required("price", self.price)?,
            stock: required("stock", self.stock)?,
            discount: required("discount", self.discount)?,
            status: required("status", self.status)?,
            slug: required("slug", self.slug)?,
            description: required("description", self.description)?,
            category_uuid: self.category_uuid,
        };
        Ok((input, image))
    }

    fn into_update_input(self) -> Result<(UpdateProductInput, Option<ImageUpload>), ServiceError> {
        let input = UpdateProductInput {
            name: required("name", self.name)?,
            price: required("price", self.price)?,
            stock: required("stock", self.stock)?,
            discount: required("discount", self.discount)?,
            status: required("status", self.status)?,
            slug: required("slug", self.slug)?,
            description: required("description", self.description)?,
            category_uuid: self.category_uuid,
        };
        Ok((input, self.image))
    }
}

#[utoipa::path(
    get,
    path = "/product",
    tag = "Product",
    responses((status = 200, description = "All products", body = ProductListResponse)),
)]
#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.products.list_products().await?;
    Ok(Json(ProductListResponse { products }))
}

#[utoipa::path(
    get,
    path = "/product/{id}",
    tag = "Product",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product, or null when the id does not exist", body = ProductShowResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn show_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.products.get_product(id).await?;
    // A missing id still answers 200 with a null payload.
    Ok(Json(ProductShowResponse { products: product }))
}

#[utoipa::path(
    post,
    path = "/product",
    tag = "Product",
    request_body(content_type = "multipart/form-data", description = "Product fields plus a required 'image' file"),
    responses(
        (status = 201, description = "Product created", body = Product),
        (status = 400, description = "Missing or malformed field", body = crate::errors::ErrorResponse),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let form = parse_product_form(multipart).await?;
    let (input, image) = form.into_create_input()?;
    let product = state.products.create_product(input, image).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[utoipa::path(
    put,
    path = "/product/{id}",
    tag = "Product",
    params(("id" = i64, Path, description = "Product ID")),
    request_body(content_type = "multipart/form-data", description = "Product fields plus an optional 'image' file"),
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, description = "Missing or malformed field", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
)]
#[instrument(skip(state, multipart))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ServiceError> {
    let form = parse_product_form(multipart).await?;
    let (input, image) = form.into_update_input()?;
    let product = state.products.update_product(id, input, image).await?;
    Ok(Json(product))
}

#[utoipa::path(
    delete,
    path = "/product/{id}",
    tag = "Product",
    params(("id" = i64, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = DeleteResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn destroy_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    state.products.delete_product(id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        message: "Data Successfully deleted!".to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/product/category",
    tag = "Product",
    responses(
        (status = 200, description = "Products joined with their category, as a bare array", body = [ProductWithCategory]),
    ),
)]
#[instrument(skip(state))]
pub async fn list_products_by_category(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let rows = state.products.list_products_with_category().await?;
    // Unlike the other endpoints, the joined rows are returned without an
    // envelope.
    Ok(Json(rows))
}

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/category", get(list_products_by_category))
        .route(
            "/:id",
            get(show_product).put(update_product).delete(destroy_product),
        )
}
