//! # Daily Close Repository
//!
//! Database operations for end-of-day cash reconciliation records.
//!
//! One close per shop per calendar day: the `close_day` column holds the
//! UTC day (`YYYY-MM-DD`) of `close_date`, and UNIQUE (shop_id, close_day)
//! rejects a second close atomically, including under races.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use dukan_core::DailyClose;

/// How many closes a history read returns at most.
const CLOSE_HISTORY_LIMIT: i64 = 30;

/// Totals submitted by the close endpoint.
#[derive(Debug, Clone, Default)]
pub struct NewDailyClose {
    pub total_sales_cents: i64,
    pub total_cash_cents: i64,
    pub total_credit_cents: i64,
    pub transaction_count: i64,
    pub notes: Option<String>,
}

/// Repository for daily close database operations.
#[derive(Debug, Clone)]
pub struct DailyCloseRepository {
    pool: SqlitePool,
}

const CLOSE_COLUMNS: &str = r#"
    id, shop_id, close_date,
    total_sales_cents, total_cash_cents, total_credit_cents,
    transaction_count, notes, closed_by, created_at
"#;

impl DailyCloseRepository {
    /// Creates a new DailyCloseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DailyCloseRepository { pool }
    }

    /// Records a close for a shop, stamped with the acting user and now.
    ///
    /// Fails with [`crate::error::DbError::UniqueViolation`] when the shop
    /// already closed this calendar day.
    pub async fn create(
        &self,
        shop_id: &str,
        closed_by: &str,
        new: NewDailyClose,
    ) -> DbResult<DailyClose> {
        let now = Utc::now();
        let close = DailyClose {
            id: Uuid::new_v4().to_string(),
            shop_id: shop_id.to_string(),
            close_date: now,
            total_sales_cents: new.total_sales_cents,
            total_cash_cents: new.total_cash_cents,
            total_credit_cents: new.total_credit_cents,
            transaction_count: new.transaction_count,
            notes: new.notes,
            closed_by: closed_by.to_string(),
            created_at: now,
        };
        let close_day = now.format("%Y-%m-%d").to_string();

        debug!(shop_id = %shop_id, day = %close_day, "Recording daily close");

        sqlx::query(
            r#"
            INSERT INTO daily_closes (
                id, shop_id, close_date, close_day,
                total_sales_cents, total_cash_cents, total_credit_cents,
                transaction_count, notes, closed_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&close.id)
        .bind(&close.shop_id)
        .bind(close.close_date)
        .bind(&close_day)
        .bind(close.total_sales_cents)
        .bind(close.total_cash_cents)
        .bind(close.total_credit_cents)
        .bind(close.transaction_count)
        .bind(&close.notes)
        .bind(&close.closed_by)
        .bind(close.created_at)
        .execute(&self.pool)
        .await?;

        info!(
            id = %close.id,
            day = %close_day,
            total = close.total_sales_cents,
            "Daily close recorded"
        );
        Ok(close)
    }

    /// Gets the close whose `close_date` falls inside a calendar-day
    /// window, if any.
    pub async fn get_in_window(
        &self,
        shop_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<Option<DailyClose>> {
        let close = sqlx::query_as::<_, DailyClose>(&format!(
            r#"
            SELECT {CLOSE_COLUMNS}
            FROM daily_closes
            WHERE shop_id = ?1 AND close_date >= ?2 AND close_date <= ?3
            "#
        ))
        .bind(shop_id)
        .bind(start)
        .bind(end)
        .fetch_optional(&self.pool)
        .await?;

        Ok(close)
    }

    /// Lists a shop's closes, most recent first, capped.
    pub async fn history(&self, shop_id: &str) -> DbResult<Vec<DailyClose>> {
        let closes = sqlx::query_as::<_, DailyClose>(&format!(
            r#"
            SELECT {CLOSE_COLUMNS}
            FROM daily_closes
            WHERE shop_id = ?1
            ORDER BY close_date DESC
            LIMIT ?2
            "#
        ))
        .bind(shop_id)
        .bind(CLOSE_HISTORY_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(closes)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
