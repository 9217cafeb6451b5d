//! Wishlist-Common: shared identifiers and error types.
//!
//! - **Typed IDs**: integer newtypes for clients, profiles and movies, so a
//!   profile id can never be passed where a client id is expected.
//! - **Error Handling**: the storage-side error type and result alias.
//!
//! # Examples
//!
//! ```
//! use wishlist_common::{ClientId, Error, Result};
//!
//! let id: ClientId = "42".parse().unwrap();
//! assert_eq!(id.get(), 42);
//!
//! fn example() -> Result<()> {
//!     Err(Error::invalid_input("client 42"))
//! }
//! # assert!(example().is_err());
//! ```

pub mod error;
pub mod ids;

pub use error::{Error, Result};
pub use ids::*;
