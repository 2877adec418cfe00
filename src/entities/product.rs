use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Product entity
///
/// `image` holds the key of the attached file in the image store; the
/// service layer keeps it in sync with the store. `deleted_at` is reserved
/// in the schema but never written: rows are hard-deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[schema(as = Product)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Primary key; callers may supply one on create, otherwise assigned
    /// by the database.
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Product name
    pub name: String,

    /// Key of the product image in the image store
    pub image: Option<String>,

    /// Price in whole currency units
    pub price: i32,

    /// Quantity on hand
    pub stock: i32,

    /// Discount amount
    pub discount: i32,

    /// Free-form status, e.g. "active" or "inactive"
    pub status: String,

    /// Human-readable identifier; uniqueness is not enforced
    pub slug: String,

    /// Product description
    #[sea_orm(column_type = "Text")]
    pub description: String,

    /// Key referencing `categories.uuid`
    pub category_uuid: Option<String>,

    /// Reserved soft-delete marker, unused by the handlers
    pub deleted_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryUuid",
        to = "super::category::Column::Uuid"
    )]
    Category,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
