//! Wishlist-DB: database schema, migrations, and query operations
//!
//! SQLite storage for the locally owned entities (clients, their profiles and
//! saved movies) using rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```
//! use wishlist_db::pool::{init_memory_pool, get_conn};
//! use wishlist_db::queries::clients;
//!
//! let pool = init_memory_pool().unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let client = clients::create_client(&conn, "Ada", "ada@example.com").unwrap();
//! assert_eq!(client.name, "Ada");
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
