//! # Repository Modules
//!
//! One repository per aggregate. Each wraps the shared [`sqlx::SqlitePool`]
//! and exposes typed async operations; multi-row writes (sale + items,
//! debt payment + ledger move, price change + history) run inside a single
//! transaction so a partial failure leaves nothing behind.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Repository Layer                                   │
//! │                                                                         │
//! │  HTTP handler                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.sales()  db.products()  db.customers()  db.shops()  db.closes()    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sqlx runtime queries (query / query_as / query_scalar)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL, foreign keys on)                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod customer;
pub mod daily_close;
pub mod product;
pub mod sale;
pub mod shop;
