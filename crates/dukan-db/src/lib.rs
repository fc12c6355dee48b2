//! # dukan-db: Database Layer for Dukan
//!
//! This crate provides database access for the Dukan backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Dukan Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (create_sale)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     dukan-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (sale.rs,    │    │  (embedded)  │  │   │
//! │  │   │               │    │   shop.rs..)  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ ShopRepo      │    │              │  │   │
//! │  │   │ Management    │    │ CustomerRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                  /var/lib/dukan/dukan.db                        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (shop, product, sale, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dukan_db::{Database, DbConfig};
//!
//! // Create database with default config
//! let config = DbConfig::new("path/to/dukan.db");
//! let db = Database::new(config).await?;
//!
//! // Use repositories
//! let shop = db.shops().get_by_user("user-1").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::customer::CustomerRepository;
pub use repository::daily_close::DailyCloseRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::shop::ShopRepository;
