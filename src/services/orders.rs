//! Order workflow: resolving the session's in-progress order and applying
//! barcode scans against it.
//!
//! Session state is threaded explicitly: callers pass in the order id their
//! session currently holds (or `None`) and store back whatever
//! [`OrderWorkflowService::resolve_active_order`] hands them. The service
//! itself never reads ambient per-user state.

use crate::{
    db::DbPool,
    entities::{order, order_detail, product, Order, OrderDetail, Product},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

/// Fixed 13% tax applied to the display total. Not configurable.
pub const TAX_MULTIPLIER: Decimal = dec!(1.13);

/// A barcode scan against the active order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScanInput {
    #[validate(length(min = 1, max = 30, message = "Barcode is required"))]
    pub barcode: String,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

/// Everything a successful scan touched, post-commit.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub order: order::Model,
    pub detail: order_detail::Model,
    pub product: product::Model,
}

/// One line of an order summary, joined with its product for display.
#[derive(Debug, Clone, Serialize)]
pub struct LineItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub barcode: String,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderSummary {
    pub order_id: Uuid,
    pub order_date: DateTime<Utc>,
    pub lines: Vec<LineItem>,
    pub subtotal: Decimal,
    pub total_with_tax: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderList {
    pub orders: Vec<order::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Clone)]
pub struct OrderWorkflowService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
}

impl OrderWorkflowService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Returns the order the session should keep building. Reuses `active`
    /// when it names a live row; otherwise creates a fresh order with a zero
    /// total. Idempotent per slot and self-healing when the referenced order
    /// was deleted out from under the session.
    #[instrument(skip(self))]
    pub async fn resolve_active_order(
        &self,
        active: Option<Uuid>,
    ) -> Result<order::Model, ServiceError> {
        if let Some(order_id) = active {
            if let Some(existing) = Order::find_by_id(order_id).one(&*self.db).await? {
                return Ok(existing);
            }
            info!(order_id = %order_id, "Session referenced a missing order; creating a new one");
        }

        let order = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            total_price: Set(Decimal::ZERO),
            order_date: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::OrderCreated(order.id))
            .await;

        info!(order_id = %order.id, "Created order");
        Ok(order)
    }

    /// Applies one scan to the order inside a single transaction: line-item
    /// upsert, running total, stock decrement. Either every step persists or
    /// none do.
    ///
    /// The stock check compares against pre-transaction stock only; two
    /// concurrent scans can jointly overdraw, and the column is allowed to
    /// go negative.
    #[instrument(skip(self, input), fields(order_id = %order_id, barcode = %input.barcode))]
    pub async fn apply_scan(
        &self,
        order_id: Uuid,
        input: ScanInput,
    ) -> Result<ScanOutcome, ServiceError> {
        input.validate()?;

        let txn = self.db.begin().await?;

        let order = Order::find_by_id(order_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let product = Product::find()
            .filter(product::Column::Barcode.eq(input.barcode.as_str()))
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No product found with the barcode '{}'. Please check and try again.",
                    input.barcode
                ))
            })?;

        if input.quantity > product.quantity_in_stock {
            return Err(ServiceError::InsufficientStock(format!(
                "Not enough inventory for {}. Only {} left in stock.",
                product.name, product.quantity_in_stock
            )));
        }

        let line_price = product.price * Decimal::from(input.quantity);

        // Upsert the (order, product) line: repeat scans accumulate.
        let existing = OrderDetail::find()
            .filter(order_detail::Column::OrderId.eq(order.id))
            .filter(order_detail::Column::ProductId.eq(product.id))
            .one(&txn)
            .await?;

        let detail = match existing {
            Some(row) => {
                let quantity = row.quantity + input.quantity;
                let price = row.price + line_price;
                let mut row: order_detail::ActiveModel = row.into();
                row.quantity = Set(quantity);
                row.price = Set(price);
                row.update(&txn).await?
            }
            None => {
                order_detail::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    order_id: Set(order.id),
                    product_id: Set(product.id),
                    quantity: Set(input.quantity),
                    price: Set(line_price),
                    order_date: Set(Utc::now()),
                }
                .insert(&txn)
                .await?
            }
        };

        let new_total = order.total_price + line_price;
        let mut order_active: order::ActiveModel = order.into();
        order_active.total_price = Set(new_total);
        let order = order_active.update(&txn).await?;

        let new_stock = product.quantity_in_stock - input.quantity;
        let mut product_active: product::ActiveModel = product.into();
        product_active.quantity_in_stock = Set(new_stock);
        let product = product_active.update(&txn).await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::ScanApplied {
                order_id: order.id,
                product_id: product.id,
                quantity: detail.quantity,
            })
            .await;

        info!(
            order_id = %order.id,
            product_id = %product.id,
            line_quantity = detail.quantity,
            total = %order.total_price,
            "Scan applied"
        );

        Ok(ScanOutcome {
            order,
            detail,
            product,
        })
    }

    /// Builds the display view of an order: its line items joined with their
    /// products, the subtotal, and the taxed total.
    #[instrument(skip(self))]
    pub async fn order_summary(&self, order_id: Uuid) -> Result<OrderSummary, ServiceError> {
        let order = Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let rows = OrderDetail::find()
            .filter(order_detail::Column::OrderId.eq(order.id))
            .find_also_related(Product)
            .all(&*self.db)
            .await?;

        let mut lines = Vec::with_capacity(rows.len());
        let mut subtotal = Decimal::ZERO;
        for (detail, product) in rows {
            subtotal += detail.price;
            let (product_name, barcode) = product
                .map(|p| (p.name, p.barcode))
                .unwrap_or_default();
            lines.push(LineItem {
                id: detail.id,
                product_id: detail.product_id,
                product_name,
                barcode,
                quantity: detail.quantity,
                price: detail.price,
            });
        }

        Ok(OrderSummary {
            order_id: order.id,
            order_date: order.order_date,
            lines,
            subtotal,
            total_with_tax: subtotal * TAX_MULTIPLIER,
        })
    }

    /// Finalizing only dissociates the session from the order; the rows stay
    /// exactly as accumulated. Returns the order so callers can confirm it.
    #[instrument(skip(self))]
    pub async fn finalize(&self, order_id: Uuid) -> Result<order::Model, ServiceError> {
        let order = Order::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        self.event_sender
            .send_or_log(Event::OrderFinalized(order.id))
            .await;

        Ok(order)
    }

    /// Lists orders, newest first.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, page: u64, per_page: u64) -> Result<OrderList, ServiceError> {
        let paginator = Order::find()
            .order_by_desc(order::Column::OrderDate)
            .paginate(&*self.db, per_page.max(1));

        let total = paginator.num_items().await?;
        let page = page.max(1);
        let orders = paginator.fetch_page(page - 1).await?;

        Ok(OrderList {
            orders,
            total,
            page,
            per_page,
        })
    }
}
