//! # Customer Repository
//!
//! Database operations for customers and their debt ledger.
//!
//! ## Debt Payment Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 record_debt_payment() transaction                       │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── SELECT total_debt_cents, total_paid_cents   (current ledger)    │
//! │    │                                                                    │
//! │    ├── guard_debt_payment(outstanding, paid)       (overpay? → abort)  │
//! │    │                                                                    │
//! │    ├── UPDATE customers SET debt -= paid, paid += paid                 │
//! │    │                                                                    │
//! │    └── INSERT INTO debt_payments (..., debt_cents = debt AFTER)        │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The ledger totals and the payment row move together, so the sum of a
//! customer's payments always reconciles against the totals columns.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use dukan_core::validation::guard_debt_payment;
use dukan_core::{Customer, DebtPayment, SettlementMethod};

/// How many payment rows a ledger read returns at most.
const DEBT_PAYMENT_LIMIT: i64 = 50;

/// New customer attributes as accepted from the create endpoint.
#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
}

/// Partial customer update. `None` fields keep their current value.
///
/// Debt totals are deliberately absent: they move only inside the sale
/// and debt-payment transactions.
#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

const CUSTOMER_COLUMNS: &str = r#"
    id, shop_id, name, phone, address, province, district,
    total_debt_cents, total_paid_cents, is_active,
    created_at, updated_at
"#;

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Lists all customers of a shop, newest first.
    pub async fn list_for_shop(&self, shop_id: &str) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            r#"
            SELECT {CUSTOMER_COLUMNS}
            FROM customers
            WHERE shop_id = ?1
            ORDER BY created_at DESC
            "#
        ))
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Creates a customer inside a shop with a clean ledger.
    pub async fn create(&self, shop_id: &str, new: NewCustomer) -> DbResult<Customer> {
        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            shop_id: shop_id.to_string(),
            name: new.name,
            phone: new.phone,
            address: new.address,
            province: new.province,
            district: new.district,
            total_debt_cents: 0,
            total_paid_cents: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %customer.id, shop_id = %shop_id, "Creating customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, shop_id, name, phone, address, province, district,
                total_debt_cents, total_paid_cents, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.shop_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.province)
        .bind(&customer.district)
        .bind(customer.total_debt_cents)
        .bind(customer.total_paid_cents)
        .bind(customer.is_active)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %customer.id, name = %customer.name, "Customer created");
        Ok(customer)
    }

    /// Applies a partial update and returns the new row.
    pub async fn update(&self, id: &str, update: CustomerUpdate) -> DbResult<Customer> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name       = COALESCE(?2, name),
                phone      = COALESCE(?3, phone),
                address    = COALESCE(?4, address),
                province   = COALESCE(?5, province),
                district   = COALESCE(?6, district),
                is_active  = COALESCE(?7, is_active),
                updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.phone)
        .bind(&update.address)
        .bind(&update.province)
        .bind(&update.district)
        .bind(update.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Settles part of a customer's debt and appends the payment row in
    /// one transaction.
    ///
    /// A payment exceeding the outstanding debt rolls back with
    /// [`dukan_core::CoreError::DebtExceedsOutstanding`]; the recorded
    /// `debt_cents` is the outstanding balance after the payment.
    pub async fn record_debt_payment(
        &self,
        customer_id: &str,
        paid_cents: i64,
        method: SettlementMethod,
        sale_id: Option<String>,
        notes: Option<String>,
    ) -> DbResult<DebtPayment> {
        let mut tx = self.pool.begin().await?;

        let outstanding: Option<i64> =
            sqlx::query_scalar("SELECT total_debt_cents FROM customers WHERE id = ?1")
                .bind(customer_id)
                .fetch_optional(&mut *tx)
                .await?;

        let outstanding = outstanding.ok_or_else(|| DbError::not_found("Customer", customer_id))?;
        guard_debt_payment(outstanding, paid_cents).map_err(DbError::Domain)?;

        let now = Utc::now();
        let payment = DebtPayment {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            sale_id,
            paid_cents,
            debt_cents: outstanding - paid_cents,
            payment_date: now,
            method,
            notes,
            created_at: now,
        };

        sqlx::query(
            r#"
            UPDATE customers SET
                total_debt_cents = total_debt_cents - ?2,
                total_paid_cents = total_paid_cents + ?2,
                updated_at       = ?3
            WHERE id = ?1
            "#,
        )
        .bind(customer_id)
        .bind(paid_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO debt_payments (
                id, customer_id, sale_id, paid_cents, debt_cents,
                payment_date, method, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.customer_id)
        .bind(&payment.sale_id)
        .bind(payment.paid_cents)
        .bind(payment.debt_cents)
        .bind(payment.payment_date)
        .bind(payment.method)
        .bind(&payment.notes)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            customer_id = %customer_id,
            paid = paid_cents,
            remaining = payment.debt_cents,
            "Debt payment recorded"
        );
        Ok(payment)
    }

    /// Lists a customer's debt payments, most recent first.
    pub async fn debt_payments(&self, customer_id: &str) -> DbResult<Vec<DebtPayment>> {
        let payments = sqlx::query_as::<_, DebtPayment>(
            r#"
            SELECT
                id, customer_id, sale_id, paid_cents, debt_cents,
                payment_date, method, notes, created_at
            FROM debt_payments
            WHERE customer_id = ?1
            ORDER BY payment_date DESC
            LIMIT ?2
            "#,
        )
        .bind(customer_id)
        .bind(DEBT_PAYMENT_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
