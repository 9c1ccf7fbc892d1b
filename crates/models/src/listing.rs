use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Shown when a seller never uploaded an image for the listing.
pub const PLACEHOLDER_IMAGE: &str = "/assets/placeholder-listing.png";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listing")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Option<f64>,
    pub price_legacy: Option<f64>,
    pub category: ListingCategory,
    pub image_url: Option<String>,
    pub seller_id: Uuid,
    pub seller_name: String,
    pub rating: f64,
    pub review_count: i32,
    pub status: ListingStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Seller }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Seller => Entity::belongs_to(crate::user::Entity)
                .from(Column::SellerId)
                .to(crate::user::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "sold")]
    Sold,
}

impl ListingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingStatus::Active => "active",
            ListingStatus::Inactive => "inactive",
            ListingStatus::Sold => "sold",
        }
    }

    /// Allowed moves: `active ↔ inactive`, `active|inactive → sold`.
    /// `sold` is terminal.
    pub fn can_transition(self, to: ListingStatus) -> bool {
        match (self, to) {
            (ListingStatus::Active, ListingStatus::Inactive) => true,
            (ListingStatus::Inactive, ListingStatus::Active) => true,
            (ListingStatus::Active, ListingStatus::Sold) => true,
            (ListingStatus::Inactive, ListingStatus::Sold) => true,
            _ => false,
        }
    }

    pub fn ensure_transition(self, to: ListingStatus) -> Result<(), ModelError> {
        if self.can_transition(to) {
            Ok(())
        } else {
            Err(ModelError::InvalidTransition(format!(
                "status cannot change from {} to {}",
                self.as_str(),
                to.as_str()
            )))
        }
    }

    /// The administrator toggle: active becomes inactive and back.
    pub fn toggled(self) -> Result<ListingStatus, ModelError> {
        match self {
            ListingStatus::Active => Ok(ListingStatus::Inactive),
            ListingStatus::Inactive => Ok(ListingStatus::Active),
            ListingStatus::Sold => Err(ModelError::InvalidTransition(
                "sold listings can no longer change status".into(),
            )),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "lowercase")]
pub enum ListingCategory {
    #[sea_orm(string_value = "programming")]
    Programming,
    #[sea_orm(string_value = "design")]
    Design,
    #[sea_orm(string_value = "art")]
    Art,
    #[sea_orm(string_value = "crafts")]
    Crafts,
    #[sea_orm(string_value = "education")]
    Education,
    #[sea_orm(string_value = "other")]
    Other,
}

impl ListingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingCategory::Programming => "programming",
            ListingCategory::Design => "design",
            ListingCategory::Art => "art",
            ListingCategory::Crafts => "crafts",
            ListingCategory::Education => "education",
            ListingCategory::Other => "other",
        }
    }
}

pub fn parse_category(raw: &str) -> Result<ListingCategory, ModelError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "programming" => Ok(ListingCategory::Programming),
        "design" => Ok(ListingCategory::Design),
        "art" => Ok(ListingCategory::Art),
        "crafts" => Ok(ListingCategory::Crafts),
        "education" => Ok(ListingCategory::Education),
        "other" => Ok(ListingCategory::Other),
        other => Err(ModelError::Validation(format!("category '{}' is not recognized", other))),
    }
}

pub fn validate_title(title: &str) -> Result<(), ModelError> {
    if title.trim().is_empty() {
        return Err(ModelError::Validation("title must not be empty".into()));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), ModelError> {
    if description.trim().is_empty() {
        return Err(ModelError::Validation("description must not be empty".into()));
    }
    Ok(())
}

pub fn validate_price(price: f64) -> Result<(), ModelError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ModelError::Validation("price must be a non-negative number".into()));
    }
    Ok(())
}

/// Fully validated input for a new listing row. `seller_name` is the display
/// copy captured at creation time; seller renames are not propagated.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: ListingCategory,
    pub image_url: Option<String>,
    pub seller_id: Uuid,
    pub seller_name: String,
}

/// Assemble the stored row: the store assigns the identifier, the creation
/// timestamp, and the initial `active` status.
pub fn build(input: NewListing) -> Model {
    let now = Utc::now().into();
    Model {
        id: Uuid::new_v4(),
        title: input.title,
        description: input.description,
        price: Some(input.price),
        price_legacy: None,
        category: input.category,
        image_url: input.image_url,
        seller_id: input.seller_id,
        seller_name: input.seller_name,
        rating: 0.0,
        review_count: 0,
        status: ListingStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

impl Model {
    /// Normalized price. Precedence: the explicit `price` column, else the
    /// `price_legacy` alias carried by imported rows, else zero.
    pub fn effective_price(&self) -> f64 {
        self.price.or(self.price_legacy).unwrap_or(0.0)
    }

    pub fn image_or_placeholder(&self) -> &str {
        self.image_url.as_deref().unwrap_or(PLACEHOLDER_IMAGE)
    }
}

pub async fn create(db: &DatabaseConnection, input: NewListing) -> Result<Model, ModelError> {
    let row = build(input);
    let am = ActiveModel {
        id: Set(row.id),
        title: Set(row.title),
        description: Set(row.description),
        price: Set(row.price),
        price_legacy: Set(row.price_legacy),
        category: Set(row.category),
        image_url: Set(row.image_url),
        seller_id: Set(row.seller_id),
        seller_name: Set(row.seller_name),
        rating: Set(row.rating),
        review_count: Set(row.review_count),
        status: Set(row.status),
        created_at: Set(row.created_at),
        updated_at: Set(row.updated_at),
    };
    am.insert(db).await.map_err(|e| ModelError::Db(e.to_string()))
}
