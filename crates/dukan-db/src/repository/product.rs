//! # Product Repository
//!
//! Database operations for products and their price history.
//!
//! ## Price Change Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    change_price() transaction                           │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── SELECT selling_price_cents          (current price)             │
//! │    │                                                                    │
//! │    ├── guard_price_change(current, old)    (stale? → rollback)         │
//! │    │                                                                    │
//! │    ├── UPDATE products SET selling_price_cents = new                   │
//! │    │                                                                    │
//! │    └── INSERT INTO price_changes (...)     (append-only history)       │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The price update and its history row land together or not at all, so
//! the history is a complete record of every price the product ever had.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use dukan_core::validation::guard_price_change;
use dukan_core::{PriceChange, Product};

/// How many history rows a price-history read returns at most.
const PRICE_HISTORY_LIMIT: i64 = 50;

/// New product attributes as accepted from the create endpoint.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub code: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub cost_price_cents: i64,
    pub selling_price_cents: i64,
    pub current_stock: i64,
    pub minimum_stock: i64,
}

/// Partial product update. `None` fields keep their current value.
///
/// The selling price is deliberately absent: it changes only through
/// [`ProductRepository::change_price`] so the history stays complete.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub cost_price_cents: Option<i64>,
    pub current_stock: Option<i64>,
    pub minimum_stock: Option<i64>,
    pub is_active: Option<bool>,
}

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str = r#"
    id, shop_id, name, code, category, unit,
    cost_price_cents, selling_price_cents,
    current_stock, minimum_stock, is_active,
    created_at, updated_at
"#;

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all products of a shop, newest first.
    pub async fn list_for_shop(&self, shop_id: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE shop_id = ?1
            ORDER BY created_at DESC
            "#
        ))
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Creates a product inside a shop.
    pub async fn create(&self, shop_id: &str, new: NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            shop_id: shop_id.to_string(),
            name: new.name,
            code: new.code,
            category: new.category,
            unit: new.unit,
            cost_price_cents: new.cost_price_cents,
            selling_price_cents: new.selling_price_cents,
            current_stock: new.current_stock,
            minimum_stock: new.minimum_stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, shop_id = %shop_id, "Creating product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, shop_id, name, code, category, unit,
                cost_price_cents, selling_price_cents,
                current_stock, minimum_stock, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&product.id)
        .bind(&product.shop_id)
        .bind(&product.name)
        .bind(&product.code)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(product.cost_price_cents)
        .bind(product.selling_price_cents)
        .bind(product.current_stock)
        .bind(product.minimum_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Applies a partial update and returns the new row.
    pub async fn update(&self, id: &str, update: ProductUpdate) -> DbResult<Product> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name             = COALESCE(?2, name),
                code             = COALESCE(?3, code),
                category         = COALESCE(?4, category),
                unit             = COALESCE(?5, unit),
                cost_price_cents = COALESCE(?6, cost_price_cents),
                current_stock    = COALESCE(?7, current_stock),
                minimum_stock    = COALESCE(?8, minimum_stock),
                is_active        = COALESCE(?9, is_active),
                updated_at       = ?10
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.code)
        .bind(&update.category)
        .bind(&update.unit)
        .bind(update.cost_price_cents)
        .bind(update.current_stock)
        .bind(update.minimum_stock)
        .bind(update.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Changes a product's selling price and appends the history row in
    /// one transaction.
    ///
    /// The supplied `old_price_cents` must equal the live selling price;
    /// a stale figure (another tab saved first) rolls the whole change
    /// back with [`dukan_core::CoreError::StalePriceChange`].
    pub async fn change_price(
        &self,
        product_id: &str,
        old_price_cents: i64,
        new_price_cents: i64,
        changed_by: &str,
        notes: Option<String>,
    ) -> DbResult<PriceChange> {
        let mut tx = self.pool.begin().await?;

        let current: Option<i64> =
            sqlx::query_scalar("SELECT selling_price_cents FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(&mut *tx)
                .await?;

        let current = current.ok_or_else(|| DbError::not_found("Product", product_id))?;
        guard_price_change(current, old_price_cents).map_err(DbError::Domain)?;

        let now = Utc::now();
        let change = PriceChange {
            id: Uuid::new_v4().to_string(),
            product_id: product_id.to_string(),
            old_price_cents,
            new_price_cents,
            changed_by: changed_by.to_string(),
            change_date: now,
            notes,
            created_at: now,
        };

        sqlx::query(
            "UPDATE products SET selling_price_cents = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(product_id)
        .bind(new_price_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO price_changes (
                id, product_id, old_price_cents, new_price_cents,
                changed_by, change_date, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&change.id)
        .bind(&change.product_id)
        .bind(change.old_price_cents)
        .bind(change.new_price_cents)
        .bind(&change.changed_by)
        .bind(change.change_date)
        .bind(&change.notes)
        .bind(change.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            product_id = %product_id,
            old = old_price_cents,
            new = new_price_cents,
            "Price changed"
        );
        Ok(change)
    }

    /// Lists a product's price history, most recent first.
    pub async fn price_history(&self, product_id: &str) -> DbResult<Vec<PriceChange>> {
        let changes = sqlx::query_as::<_, PriceChange>(
            r#"
            SELECT
                id, product_id, old_price_cents, new_price_cents,
                changed_by, change_date, notes, created_at
            FROM price_changes
            WHERE product_id = ?1
            ORDER BY change_date DESC
            LIMIT ?2
            "#,
        )
        .bind(product_id)
        .bind(PRICE_HISTORY_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(changes)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
