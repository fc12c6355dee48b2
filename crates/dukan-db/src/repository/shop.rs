//! # Shop Repository
//!
//! Database operations for shops. One shop per user: the `user_id` column
//! carries a UNIQUE constraint, so a second create for the same user maps
//! to [`DbError::UniqueViolation`] and surfaces as a conflict upstream.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use dukan_core::Shop;

/// New shop attributes as accepted from the create endpoint.
#[derive(Debug, Clone, Default)]
pub struct NewShop {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub sub_district: Option<String>,
    pub postal_code: Option<String>,
}

/// Partial shop update. `None` fields keep their current value.
#[derive(Debug, Clone, Default)]
pub struct ShopUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub sub_district: Option<String>,
    pub postal_code: Option<String>,
}

/// Repository for shop database operations.
#[derive(Debug, Clone)]
pub struct ShopRepository {
    pool: SqlitePool,
}

impl ShopRepository {
    /// Creates a new ShopRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShopRepository { pool }
    }

    /// Gets the shop owned by a user, if any.
    pub async fn get_by_user(&self, user_id: &str) -> DbResult<Option<Shop>> {
        let shop = sqlx::query_as::<_, Shop>(
            r#"
            SELECT
                id, user_id, name, phone, address,
                province, district, sub_district, postal_code,
                created_at, updated_at
            FROM shops
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(shop)
    }

    /// Creates a shop for a user.
    ///
    /// The UNIQUE constraint on `user_id` rejects a second shop for the
    /// same user atomically; a racing duplicate create loses cleanly and
    /// the winner's data is untouched.
    pub async fn create(&self, user_id: &str, new: NewShop) -> DbResult<Shop> {
        let now = Utc::now();
        let shop = Shop {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name: new.name,
            phone: new.phone,
            address: new.address,
            province: new.province,
            district: new.district,
            sub_district: new.sub_district,
            postal_code: new.postal_code,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %shop.id, user_id = %user_id, "Creating shop");

        sqlx::query(
            r#"
            INSERT INTO shops (
                id, user_id, name, phone, address,
                province, district, sub_district, postal_code,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&shop.id)
        .bind(&shop.user_id)
        .bind(&shop.name)
        .bind(&shop.phone)
        .bind(&shop.address)
        .bind(&shop.province)
        .bind(&shop.district)
        .bind(&shop.sub_district)
        .bind(&shop.postal_code)
        .bind(shop.created_at)
        .bind(shop.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %shop.id, name = %shop.name, "Shop created");
        Ok(shop)
    }

    /// Applies a partial update to a user's shop and returns the new row.
    ///
    /// Returns `Ok(None)` when the user owns no shop.
    pub async fn update_for_user(
        &self,
        user_id: &str,
        update: ShopUpdate,
    ) -> DbResult<Option<Shop>> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE shops SET
                name         = COALESCE(?2, name),
                phone        = COALESCE(?3, phone),
                address      = COALESCE(?4, address),
                province     = COALESCE(?5, province),
                district     = COALESCE(?6, district),
                sub_district = COALESCE(?7, sub_district),
                postal_code  = COALESCE(?8, postal_code),
                updated_at   = ?9
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .bind(&update.name)
        .bind(&update.phone)
        .bind(&update.address)
        .bind(&update.province)
        .bind(&update.district)
        .bind(&update.sub_district)
        .bind(&update.postal_code)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_user(user_id).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
