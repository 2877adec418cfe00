use utoipa::OpenApi;

/// OpenAPI document for the product catalog service.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Aradan Product API",
        description = "Product CRUD with image attachments for the Aradan online shop",
    ),
    paths(
        crate::handlers::products::list_products,
        crate::handlers::products::show_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::destroy_product,
        crate::handlers::products::list_products_by_category,
        crate::handlers::health::health_check,
    ),
    components(schemas(
        crate::entities::product::Model,
        crate::repositories::ProductWithCategory,
        crate::handlers::products::ProductListResponse,
        crate::handlers::products::ProductShowResponse,
        crate::handlers::products::DeleteResponse,
        crate::handlers::health::HealthResponse,
        crate::errors::ErrorResponse,
    )),
    tags(
        (name = "Product", description = "Product catalog operations"),
        (name = "Health", description = "Service health"),
    ),
)]
pub struct ApiDoc;
