//! Product maintenance: creation with the advisory duplicate-barcode check,
//! and allow-listed edits.

use crate::{
    cache::{CacheBackend, InMemoryCache},
    db::DbPool,
    entities::{product, Category, Product},
    errors::ServiceError,
    events::{Event, EventSender},
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Aggregate listing key invalidated whenever a product is edited.
const PRODUCT_LIST_CACHE_KEY: &str = "product_list";

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Brand is required"))]
    pub brand: String,
    #[validate(length(max = 50))]
    #[serde(default)]
    pub item_number: String,
    pub price: Decimal,
    #[validate(length(min = 1, max = 30, message = "Barcode is required"))]
    pub barcode: String,
    #[serde(default)]
    pub quantity_in_stock: i32,
    pub category_id: Uuid,
    #[validate(length(max = 50))]
    #[serde(default)]
    pub unit_size: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(max = 50))]
    #[serde(default)]
    pub discount: String,
}

/// Allow-listed edit. Absent fields are left untouched; `discount` is
/// deliberately not editable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 200, message = "Name must not be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Brand must not be empty"))]
    pub brand: Option<String>,
    pub price: Option<Decimal>,
    #[validate(length(min = 1, max = 30, message = "Barcode must not be empty"))]
    pub barcode: Option<String>,
    #[validate(length(max = 50))]
    pub item_number: Option<String>,
    pub quantity_in_stock: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    #[validate(length(max = 50))]
    pub unit_size: Option<String>,
}

#[derive(Clone)]
pub struct ProductService {
    db: Arc<DbPool>,
    cache: Arc<InMemoryCache>,
    event_sender: Arc<EventSender>,
}

impl ProductService {
    pub fn new(db: Arc<DbPool>, cache: Arc<InMemoryCache>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db,
            cache,
            event_sender,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    /// Creates a product. The duplicate-barcode check runs before the insert
    /// and is advisory only: the schema carries no uniqueness constraint, so
    /// concurrent creates can still race past it.
    #[instrument(skip(self, input), fields(barcode = %input.barcode))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<product::Model, ServiceError> {
        input.validate()?;

        Category::find_by_id(input.category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Category {} not found", input.category_id))
            })?;

        let duplicate = Product::find()
            .filter(product::Column::Barcode.eq(input.barcode.as_str()))
            .one(&*self.db)
            .await?;
        if duplicate.is_some() {
            return Err(ServiceError::DuplicateBarcode(format!(
                "A product with barcode '{}' already exists.",
                input.barcode
            )));
        }

        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            brand: Set(input.brand),
            item_number: Set(input.item_number),
            price: Set(input.price),
            barcode: Set(input.barcode),
            quantity_in_stock: Set(input.quantity_in_stock),
            category_id: Set(input.category_id),
            unit_size: Set(input.unit_size),
            description: Set(input.description),
            discount: Set(input.discount),
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product.id))
            .await;

        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Applies an allow-listed edit and invalidates the cached product-list
    /// aggregate.
    #[instrument(skip(self, input), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        input: UpdateProductInput,
    ) -> Result<product::Model, ServiceError> {
        input.validate()?;

        let product = Product::find_by_id(product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        if let Some(category_id) = input.category_id {
            Category::find_by_id(category_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Category {} not found", category_id))
                })?;
        }

        let mut active: product::ActiveModel = product.into();
        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(brand) = input.brand {
            active.brand = Set(brand);
        }
        if let Some(price) = input.price {
            active.price = Set(price);
        }
        if let Some(barcode) = input.barcode {
            active.barcode = Set(barcode);
        }
        if let Some(item_number) = input.item_number {
            active.item_number = Set(item_number);
        }
        if let Some(quantity_in_stock) = input.quantity_in_stock {
            active.quantity_in_stock = Set(quantity_in_stock);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(unit_size) = input.unit_size {
            active.unit_size = Set(unit_size);
        }

        let product = active.update(&*self.db).await?;

        if let Err(e) = self.cache.delete(PRODUCT_LIST_CACHE_KEY).await {
            warn!(error = %e, "Product list cache invalidation failed");
        }

        self.event_sender
            .send_or_log(Event::ProductUpdated(product.id))
            .await;

        info!(product_id = %product.id, "Product updated");
        Ok(product)
    }
}
