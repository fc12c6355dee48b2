//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! ## Sale Creation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create_sale() transaction                            │
//! │                                                                         │
//! │  client_ref supplied? ── yes ──► existing sale? ──► return it (no new   │
//! │        │                                            rows at all)        │
//! │        ▼                                                                │
//! │  BEGIN                                                                  │
//! │    ├── INSERT INTO sales (...)                                          │
//! │    ├── INSERT INTO sale_items (...)       one row per line              │
//! │    ├── customer + debt > 0?  UPDATE customers SET debt += debt          │
//! │    └── deduct_stock?         UPDATE products SET stock = MAX(0, s - q)  │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Exactly one sale and exactly N items land, or nothing does.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A unique index on (shop_id, client_ref) backs the idempotency check
//! under races: the loser of a concurrent duplicate insert gets the
//! constraint violation, re-reads, and returns the winner's sale.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use dukan_core::validation::SaleDraft;
use dukan_core::{Sale, SaleItem};

/// How many sales a recent-sales read returns at most.
const SALES_LIST_LIMIT: i64 = 100;

/// A sale together with its line items, as returned by the reads the POS
/// receipt view and the sale-create response share.
#[derive(Debug, Clone)]
pub struct SaleWithItems {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

const SALE_COLUMNS: &str = r#"
    id, shop_id, customer_id, sale_date,
    total_cents, paid_cents, debt_cents,
    payment_method, notes, client_ref,
    created_at, updated_at
"#;

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a sale with its items.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<SaleWithItems>> {
        let Some(sale) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.items_for_sale(id).await?;
        Ok(Some(SaleWithItems { sale, items }))
    }

    /// Gets all items of a sale, in insertion order.
    pub async fn items_for_sale(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, quantity,
                   unit_price_cents, line_total_cents, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Finds a shop's sale by its idempotency token.
    pub async fn find_by_client_ref(
        &self,
        shop_id: &str,
        client_ref: &str,
    ) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE shop_id = ?1 AND client_ref = ?2"
        ))
        .bind(shop_id)
        .bind(client_ref)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Records a sale with all its items in one transaction.
    ///
    /// The draft must already have passed
    /// [`dukan_core::validation::validate_sale_draft`]. When the sale
    /// carries debt and a customer, the customer's ledger moves inside the
    /// same transaction; when `deduct_stock` is set, each line decrements
    /// its product's stock, floored at zero.
    ///
    /// Resubmitting a draft whose `client_ref` already exists for the shop
    /// returns the original sale without writing anything.
    pub async fn create_sale(
        &self,
        shop_id: &str,
        draft: &SaleDraft,
        deduct_stock: bool,
    ) -> DbResult<SaleWithItems> {
        if let Some(client_ref) = &draft.client_ref {
            if let Some(existing) = self.find_by_client_ref(shop_id, client_ref).await? {
                debug!(sale_id = %existing.id, client_ref = %client_ref, "Sale replayed by client_ref");
                let items = self.items_for_sale(&existing.id).await?;
                return Ok(SaleWithItems { sale: existing, items });
            }
        }

        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            shop_id: shop_id.to_string(),
            customer_id: draft.customer_id.clone(),
            sale_date: draft.sale_date,
            total_cents: draft.total_cents,
            paid_cents: draft.paid_cents,
            debt_cents: draft.debt_cents,
            payment_method: draft.payment_method,
            notes: draft.notes.clone(),
            client_ref: draft.client_ref.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(id = %sale.id, items = draft.items.len(), "Creating sale");

        let mut tx = self.pool.begin().await?;

        let insert = sqlx::query(
            r#"
            INSERT INTO sales (
                id, shop_id, customer_id, sale_date,
                total_cents, paid_cents, debt_cents,
                payment_method, notes, client_ref,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.shop_id)
        .bind(&sale.customer_id)
        .bind(sale.sale_date)
        .bind(sale.total_cents)
        .bind(sale.paid_cents)
        .bind(sale.debt_cents)
        .bind(sale.payment_method)
        .bind(&sale.notes)
        .bind(&sale.client_ref)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .execute(&mut *tx)
        .await;

        if let Err(err) = insert {
            let err = DbError::from(err);
            // Lost a race on the idempotency index: the winner's sale is
            // the result of this request too.
            if let (DbError::UniqueViolation { .. }, Some(client_ref)) = (&err, &draft.client_ref) {
                drop(tx);
                if let Some(existing) = self.find_by_client_ref(shop_id, client_ref).await? {
                    let items = self.items_for_sale(&existing.id).await?;
                    return Ok(SaleWithItems { sale: existing, items });
                }
            }
            return Err(err);
        }

        let mut items = Vec::with_capacity(draft.items.len());
        for line in &draft.items {
            let item = SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale.id.clone(),
                product_id: line.product_id.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line.line_total_cents,
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    id, sale_id, product_id, quantity,
                    unit_price_cents, line_total_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.sale_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.line_total_cents)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            if deduct_stock {
                sqlx::query(
                    r#"
                    UPDATE products SET
                        current_stock = MAX(current_stock - ?2, 0),
                        updated_at    = ?3
                    WHERE id = ?1
                    "#,
                )
                .bind(&item.product_id)
                .bind(item.quantity)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }

            items.push(item);
        }

        if sale.debt_cents > 0 {
            if let Some(customer_id) = &sale.customer_id {
                sqlx::query(
                    r#"
                    UPDATE customers SET
                        total_debt_cents = total_debt_cents + ?2,
                        updated_at       = ?3
                    WHERE id = ?1
                    "#,
                )
                .bind(customer_id)
                .bind(sale.debt_cents)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        info!(
            id = %sale.id,
            total = sale.total_cents,
            method = ?sale.payment_method,
            items = items.len(),
            "Sale recorded"
        );
        Ok(SaleWithItems { sale, items })
    }

    /// Lists a shop's sales, most recent first, capped.
    pub async fn list_recent(&self, shop_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE shop_id = ?1
            ORDER BY sale_date DESC
            LIMIT ?2
            "#
        ))
        .bind(shop_id)
        .bind(SALES_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists a shop's sales whose `sale_date` falls inside a closed
    /// interval, oldest first. Feeds the dashboard aggregation.
    pub async fn list_in_window(
        &self,
        shop_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            r#"
            SELECT {SALE_COLUMNS}
            FROM sales
            WHERE shop_id = ?1 AND sale_date >= ?2 AND sale_date <= ?3
            ORDER BY sale_date
            "#
        ))
        .bind(shop_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists the items of every sale of a shop inside a closed interval.
    /// Feeds the top-selling-products ranking.
    pub async fn items_in_window(
        &self,
        shop_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT si.id, si.sale_id, si.product_id, si.quantity,
                   si.unit_price_cents, si.line_total_cents, si.created_at
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.shop_id = ?1 AND s.sale_date >= ?2 AND s.sale_date <= ?3
            ORDER BY si.created_at
            "#,
        )
        .bind(shop_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::customer::NewCustomer;
    use crate::repository::product::NewProduct;
    use crate::repository::shop::NewShop;
    use dukan_core::validation::SaleLine;
    use dukan_core::PaymentMethod;

    struct Fixture {
        db: Database,
        shop_id: String,
        customer_id: String,
        product_id: String,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let shop = db
            .shops()
            .create(
                "user-1",
                NewShop {
                    name: "Test Shop".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let customer = db
            .customers()
            .create(
                &shop.id,
                NewCustomer {
                    name: "Test Customer".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let product = db
            .products()
            .create(
                &shop.id,
                NewProduct {
                    name: "Test Product".to_string(),
                    selling_price_cents: 15000,
                    current_stock: 50,
                    minimum_stock: 5,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        Fixture {
            db,
            shop_id: shop.id,
            customer_id: customer.id,
            product_id: product.id,
        }
    }

    fn cash_draft(product_id: &str, qty: i64, unit: i64) -> SaleDraft {
        SaleDraft {
            customer_id: None,
            sale_date: Utc::now(),
            total_cents: qty * unit,
            paid_cents: qty * unit,
            debt_cents: 0,
            payment_method: PaymentMethod::Cash,
            notes: None,
            client_ref: None,
            items: vec![SaleLine {
                product_id: product_id.to_string(),
                quantity: qty,
                unit_price_cents: unit,
                line_total_cents: qty * unit,
            }],
        }
    }

    #[tokio::test]
    async fn test_create_sale_writes_one_sale_and_n_items() {
        let fx = fixture().await;
        let mut draft = cash_draft(&fx.product_id, 1, 15000);
        draft.items.push(SaleLine {
            product_id: fx.product_id.clone(),
            quantity: 2,
            unit_price_cents: 5000,
            line_total_cents: 10000,
        });
        draft.total_cents = 25000;
        draft.paid_cents = 25000;

        let created = fx
            .db
            .sales()
            .create_sale(&fx.shop_id, &draft, false)
            .await
            .unwrap();
        assert_eq!(created.items.len(), 2);
        assert!(created.items.iter().all(|i| i.sale_id == created.sale.id));

        let fetched = fx
            .db
            .sales()
            .get_with_items(&created.sale.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched.sale.total_cents, 25000);
        assert_eq!(fetched.items.len(), 2);
    }

    #[tokio::test]
    async fn test_cash_sale_scenario() {
        let fx = fixture().await;
        let draft = cash_draft(&fx.product_id, 1, 15000);

        let created = fx
            .db
            .sales()
            .create_sale(&fx.shop_id, &draft, false)
            .await
            .unwrap();
        assert_eq!(created.sale.total_cents, 15000);
        assert_eq!(created.sale.payment_method, PaymentMethod::Cash);

        let listed = fx.db.sales().list_recent(&fx.shop_id).await.unwrap();
        assert!(listed.iter().any(|s| s.id == created.sale.id));
    }

    #[tokio::test]
    async fn test_credit_sale_grows_customer_debt() {
        let fx = fixture().await;
        let mut draft = cash_draft(&fx.product_id, 2, 15000);
        draft.payment_method = PaymentMethod::Credit;
        draft.paid_cents = 0;
        draft.debt_cents = 30000;
        draft.customer_id = Some(fx.customer_id.clone());

        let created = fx
            .db
            .sales()
            .create_sale(&fx.shop_id, &draft, false)
            .await
            .unwrap();
        assert_eq!(created.sale.debt_cents, 30000);

        let customer = fx
            .db
            .customers()
            .get_by_id(&fx.customer_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.total_debt_cents, 30000);
    }

    #[tokio::test]
    async fn test_stock_untouched_by_default() {
        let fx = fixture().await;
        let draft = cash_draft(&fx.product_id, 3, 15000);

        fx.db
            .sales()
            .create_sale(&fx.shop_id, &draft, false)
            .await
            .unwrap();

        let product = fx
            .db
            .products()
            .get_by_id(&fx.product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.current_stock, 50);
    }

    #[tokio::test]
    async fn test_stock_deduction_when_enabled_floors_at_zero() {
        let fx = fixture().await;

        let draft = cash_draft(&fx.product_id, 3, 15000);
        fx.db
            .sales()
            .create_sale(&fx.shop_id, &draft, true)
            .await
            .unwrap();
        let product = fx
            .db
            .products()
            .get_by_id(&fx.product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.current_stock, 47);

        // Sell far more than remains; the shelf count stops at zero
        let big = cash_draft(&fx.product_id, 999, 15000);
        fx.db
            .sales()
            .create_sale(&fx.shop_id, &big, true)
            .await
            .unwrap();
        let product = fx
            .db
            .products()
            .get_by_id(&fx.product_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(product.current_stock, 0);
    }

    #[tokio::test]
    async fn test_client_ref_replay_returns_original() {
        let fx = fixture().await;
        let mut draft = cash_draft(&fx.product_id, 1, 15000);
        draft.client_ref = Some("pos-7f3a".to_string());

        let first = fx
            .db
            .sales()
            .create_sale(&fx.shop_id, &draft, false)
            .await
            .unwrap();
        let second = fx
            .db
            .sales()
            .create_sale(&fx.shop_id, &draft, false)
            .await
            .unwrap();

        assert_eq!(first.sale.id, second.sale.id);
        assert_eq!(fx.db.sales().list_recent(&fx.shop_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_window_queries() {
        let fx = fixture().await;
        let repo = fx.db.sales();

        let mut today = cash_draft(&fx.product_id, 1, 15000);
        today.sale_date = Utc::now();
        let mut last_year = cash_draft(&fx.product_id, 1, 15000);
        last_year.sale_date = Utc::now() - chrono::Duration::days(365);

        repo.create_sale(&fx.shop_id, &today, false).await.unwrap();
        repo.create_sale(&fx.shop_id, &last_year, false).await.unwrap();

        let start = Utc::now() - chrono::Duration::days(1);
        let end = Utc::now() + chrono::Duration::days(1);
        let sales = repo.list_in_window(&fx.shop_id, start, end).await.unwrap();
        assert_eq!(sales.len(), 1);

        let items = repo.items_in_window(&fx.shop_id, start, end).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, fx.product_id);
    }
}
