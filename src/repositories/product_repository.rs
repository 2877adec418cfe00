use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, ModelTrait,
    QueryOrder, QuerySelect, RelationTrait, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::entities::category;
use crate::entities::product::{self, Entity as Product, Model as ProductModel};
use crate::errors::ServiceError;
use crate::repositories::Repository;
use crate::services::products::{CreateProductInput, UpdateProductInput};

use super::BaseRepository;

/// A product row joined with its category, as returned by the category
/// listing. Products without a matching category are excluded (inner join).
#[derive(Debug, Clone, FromQueryResult, Serialize, ToSchema)]
pub struct ProductWithCategory {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub price: i32,
    pub stock: i32,
    pub discount: i32,
    pub status: String,
    pub slug: String,
    pub description: String,
    pub category_uuid: String,
    pub category_name: String,
}

/// Repository for product rows. Pure database access; image-store side
/// effects belong to the service layer.
#[derive(Debug)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Insert a new product row. `image_key` is the key the service stored
    /// the uploaded image under.
    pub async fn insert(
        &self,
        input: &CreateProductInput,
        image_key: String,
    ) -> Result<ProductModel, ServiceError> {
        let now = Utc::now();
        let mut row = product::ActiveModel {
            name: Set(input.name.clone()),
            image: Set(Some(image_key)),
            price: Set(input.price),
            stock: Set(input.stock),
            discount: Set(input.discount),
            status: Set(input.status.clone()),
            slug: Set(input.slug.clone()),
            description: Set(input.description.clone()),
            category_uuid: Set(input.category_uuid.clone()),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            ..Default::default()
        };
        // Callers may pin the id; otherwise the database assigns one.
        if let Some(id) = input.id {
            row.id = Set(id);
        }

        row.insert(self.base.get_db()).await.map_err(|e| {
            error!(error = %e, "Database error when inserting product");
            ServiceError::DatabaseError(e)
        })
    }

    /// Find a product by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ProductModel>, ServiceError> {
        Product::find_by_id(id)
            .one(self.base.get_db())
            .await
            .map_err(|e| {
                error!(product_id = %id, error = %e, "Database error when fetching product");
                ServiceError::DatabaseError(e)
            })
    }

    /// List all products in primary-key order
    pub async fn find_all(&self) -> Result<Vec<ProductModel>, ServiceError> {
        Product::find()
            .order_by_asc(product::Column::Id)
            .all(self.base.get_db())
            .await
            .map_err(|e| {
                error!(error = %e, "Database error when listing products");
                ServiceError::DatabaseError(e)
            })
    }

    /// Overwrite every mutable field of `current` from `input`.
    ///
    /// Callers always supply the full set of mutable fields; there are no
    /// partial-update semantics. `new_image` replaces the stored image key
    /// when present, otherwise the existing key is retained.
    pub async fn update(
        &self,
        current: ProductModel,
        input: &UpdateProductInput,
        new_image: Option<String>,
    ) -> Result<ProductModel, ServiceError> {
        let id = current.id;
        let mut row: product::ActiveModel = current.into();
        row.name = Set(input.name.clone());
        row.price = Set(input.price);
        row.stock = Set(input.stock);
        row.discount = Set(input.discount);
        row.status = Set(input.status.clone());
        row.slug = Set(input.slug.clone());
        row.description = Set(input.description.clone());
        row.category_uuid = Set(input.category_uuid.clone());
        if let Some(key) = new_image {
            row.image = Set(Some(key));
        }
        row.updated_at = Set(Some(Utc::now()));

        row.update(self.base.get_db()).await.map_err(|e| {
            error!(product_id = %id, error = %e, "Database error when updating product");
            ServiceError::DatabaseError(e)
        })
    }

    /// Hard-delete a product row. The `deleted_at` column stays unused.
    pub async fn delete(&self, product: ProductModel) -> Result<(), ServiceError> {
        let id = product.id;
        product.delete(self.base.get_db()).await.map_err(|e| {
            error!(product_id = %id, error = %e, "Database error when deleting product");
            ServiceError::DatabaseError(e)
        })?;
        Ok(())
    }

    /// List products inner-joined with their category. Products whose
    /// `category_uuid` matches no category row are excluded.
    pub async fn find_all_with_category(
        &self,
    ) -> Result<Vec<ProductWithCategory>, ServiceError> {
        Product::find()
            .join(JoinType::InnerJoin, product::Relation::Category.def())
            .column_as(category::Column::Name, "category_name")
            .order_by_asc(product::Column::Id)
            .into_model::<ProductWithCategory>()
            .all(self.base.get_db())
            .await
            .map_err(|e| {
                error!(error = %e, "Database error when listing products by category");
                ServiceError::DatabaseError(e)
            })
    }
}
