use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::db::DbPool;
use crate::entities::product::Model as ProductModel;
use crate::errors::ServiceError;
use crate::repositories::{ProductRepository, ProductWithCategory};
use crate::storage::ImageStore;

/// An image file extracted from a multipart request.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Bytes,
}

/// Fields accepted when creating a product. The image file travels
/// separately as an [`ImageUpload`].
#[derive(Debug, Clone, Validate)]
pub struct CreateProductInput {
    /// Optional caller-assigned id; the database assigns one when absent.
    pub id: Option<i64>,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 0))]
    pub price: i32,
    #[validate(range(min = 0))]
    pub stock: i32,
    pub discount: i32,
    #[validate(length(min = 1, max = 64))]
    pub status: String,
    #[validate(length(min = 1, max = 255))]
    pub slug: String,
    pub description: String,
    pub category_uuid: Option<String>,
}

/// Fields accepted when updating a product. Every mutable field must be
/// supplied; the update overwrites them all. The image is optional: when
/// omitted the stored image key is retained.
#[derive(Debug, Clone, Validate)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(range(min = 0))]
    pub price: i32,
    #[validate(range(min = 0))]
    pub stock: i32,
    pub discount: i32,
    #[validate(length(min = 1, max = 64))]
    pub status: String,
    #[validate(length(min = 1, max = 255))]
    pub slug: String,
    pub description: String,
    pub category_uuid: Option<String>,
}

/// Service for managing products.
///
/// Orchestrates each operation: validates input, coordinates image-store
/// side effects, and calls the repository. The repository owns row
/// lifetime; this service owns image lifetime. There is no transaction
/// spanning the two: a row failure after a successful image write leaves
/// an orphaned object, which is logged and accepted.
///
/// Image keys are content-addressed, so products created from identical
/// bytes share one stored object. Update and delete remove the object for
/// the key on the row being changed without reference counting: a sibling
/// row still naming that key is left dangling until its own image is
/// replaced or re-uploaded.
pub struct ProductService {
    repo: ProductRepository,
    images: Arc<dyn ImageStore>,
}

impl ProductService {
    /// Creates a new product service instance
    pub fn new(db: Arc<DbPool>, images: Arc<dyn ImageStore>) -> Self {
        Self {
            repo: ProductRepository::new(db),
            images,
        }
    }

    /// List all products
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductModel>, ServiceError> {
        self.repo.find_all().await
    }

    /// Get a product by ID. A missing id is not an error here; the handler
    /// decides how to present absence.
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: i64) -> Result<Option<ProductModel>, ServiceError> {
        self.repo.find_by_id(id).await
    }

    /// Create a new product. The image is required: it is stored first,
    /// then the row is inserted with the generated key.
    #[instrument(skip(self, image), fields(name = %input.name, slug = %input.slug))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
        image: ImageUpload,
    ) -> Result<ProductModel, ServiceError> {
        input.validate()?;

        let image_key = self.images.put(&image.filename, &image.bytes).await?;

        match self.repo.insert(&input, image_key.clone()).await {
            Ok(product) => {
                info!(product_id = %product.id, image_key = %image_key, "Product created");
                Ok(product)
            }
            Err(e) => {
                // The stored image is now orphaned; there is no compensating
                // delete across the store/database boundary.
                warn!(image_key = %image_key, "Product insert failed after image was stored");
                Err(e)
            }
        }
    }

    /// Update a product. When a new image is supplied the old key is
    /// deleted best-effort and the new key recorded; otherwise all
    /// non-image fields are overwritten and the key retained.
    #[instrument(skip(self, image), fields(has_image = image.is_some()))]
    pub async fn update_product(
        &self,
        id: i64,
        input: UpdateProductInput,
        image: Option<ImageUpload>,
    ) -> Result<ProductModel, ServiceError> {
        input.validate()?;

        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product with ID {id} not found")))?;

        let new_key = match image {
            Some(upload) => {
                if let Some(old_key) = current.image.as_deref() {
                    match self.images.delete(old_key).await {
                        Ok(true) => {}
                        Ok(false) => {
                            warn!(product_id = %id, image_key = %old_key, "Replaced image was already missing from the store")
                        }
                        Err(e) => {
                            warn!(product_id = %id, image_key = %old_key, error = %e, "Failed to delete replaced image")
                        }
                    }
                }
                Some(self.images.put(&upload.filename, &upload.bytes).await?)
            }
            None => None,
        };

        let updated = self.repo.update(current, &input, new_key).await?;
        info!(product_id = %updated.id, "Product updated");
        Ok(updated)
    }

    /// Delete a product: best-effort removal of its image, then a hard
    /// delete of the row. A missing image object never aborts the delete.
    /// The object is removed even when another row shares the same
    /// content key.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: i64) -> Result<(), ServiceError> {
        let product = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product with ID {id} not found")))?;

        if let Some(image_key) = product.image.as_deref() {
            match self.images.delete(image_key).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!(product_id = %id, image_key = %image_key, "Image was already missing from the store")
                }
                Err(e) => {
                    warn!(product_id = %id, image_key = %image_key, error = %e, "Failed to delete image")
                }
            }
        }

        self.repo.delete(product).await?;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// List products joined with their category (inner join: products with
    /// no matching category are excluded).
    #[instrument(skip(self))]
    pub async fn list_products_with_category(
        &self,
    ) -> Result<Vec<ProductWithCategory>, ServiceError> {
        self.repo.find_all_with_category().await
    }
}
