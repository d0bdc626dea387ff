//! HTTP collaborator for roulette.
//!
//! [`HttpReconciliationClient`] implements
//! [`roulette_core::ReconciliationClient`] against the participants service:
//!
//! ```text
//! GET   {base}/participants?filter=<key>   -> [PoolEntry]
//! GET   {base}/history                     -> [HistoryEntry]
//! PATCH {base}/participants                <- { id, filterKey }
//! POST  {base}/participants/reset          <- { filterKey }
//! ```
//!
//! # Example
//!
//! ```ignore
//! use roulette_remote::HttpReconciliationClient;
//!
//! let client = HttpReconciliationClient::builder("http://localhost:3000/api")
//!     .token("s3cret")
//!     .build()?;
//! ```

mod error;
mod http;
mod token;

pub use error::{Error, Result};
pub use http::{DEFAULT_TIMEOUT, HttpClientBuilder, HttpReconciliationClient};
pub use token::ApiToken;
