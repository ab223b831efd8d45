//! mockbase - an in-process stand-in for a hosted relational backend
//!
//! Fixture tables, a lazy chainable query builder, an auth emulator with
//! change notifications, and a client facade tying them together.
//!
//! ```ignore
//! use mockbase::{Client, ClientConfig};
//!
//! let client = Client::new(ClientConfig::instant());
//! let posts = client
//!     .table("posts")
//!     .select("*, profiles(username)")
//!     .eq("status", "published")
//!     .order("created_at", false)
//!     .range(0, 9)
//!     .await;
//! ```

pub mod auth;
pub mod cli;
pub mod client;
pub mod errors;
pub mod fixtures;
pub mod observability;
pub mod query;

pub use client::{Client, ClientConfig};
pub use errors::{ClientError, ErrorCode, ErrorDescriptor};
pub use query::{QueryBuilder, ResultEnvelope};
