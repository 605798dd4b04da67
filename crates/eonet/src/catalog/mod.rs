//! EONET API client and record parser.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for API and record validation failures
//! - [`types`] - Wire envelopes and raw records
//! - [`client`] - HTTP client implementing [`CatalogSource`](crate::source::CatalogSource)
//! - [`convert`] - Raw record to typed model conversion
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use eonet::catalog::{DEFAULT_API, EonetClient};
//! use eonet::source::CatalogSource;
//!
//! let client = EonetClient::new(DEFAULT_API, Duration::from_secs(30))?;
//! for category in client.fetch_categories().await? {
//!     println!("{} ({})", category.name, category.id);
//! }
//! ```

mod client;
mod convert;
mod error;
mod types;

pub use client::{
    CATEGORIES_ENDPOINT, DEFAULT_API, DEFAULT_TIMEOUT_SECS, EVENTS_ENDPOINT, EonetClient,
};
pub use convert::{parse_categories, parse_category, parse_event, parse_events};
pub use error::{EonetError, ParseError, short_error_message};
