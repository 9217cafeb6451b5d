//! External title-metadata provider.
//!
//! # Module layout
//!
//! - [`provider`] -- Trait definition and shared data types.
//! - [`providers`] -- Concrete provider implementations (WatchMode).

pub mod provider;
pub mod providers;

pub use provider::{MetadataProvider, Network, SearchResult, TitleDetail, TitleId, TitleSource};
pub use providers::WatchmodeProvider;
