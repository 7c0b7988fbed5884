//! # Power BI client
//!
//! Thin asynchronous client for the slice of the Power BI REST API that the
//! workspace reconciler needs: listing capacities, creating, reading and
//! deleting workspaces (groups), and assigning a workspace to a capacity.
//!
//! The [`PowerBiApi`] trait is the seam between the reconciler and the
//! transport. [`HttpClient`] implements it over HTTPS+JSON; with the
//! `test-utils` feature enabled, [`mock::MockPowerBi`] implements it in memory.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pbi_client::{ClientConfig, HttpClient, PowerBiApi};
//!
//! # async fn example() -> pbi_client::Result<()> {
//! let config = ClientConfig::default().with_access_token("eyJ0eXAi...");
//! let client = HttpClient::new(config)?;
//!
//! for capacity in client.list_capacities().await? {
//!     println!("{} {}", capacity.id, capacity.display_name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use api::PowerBiApi;
pub use config::{ClientConfig, DEFAULT_API_URL};
pub use error::{ClientError, Result};
pub use http::HttpClient;
pub use types::{Capacity, Workspace, NO_CAPACITY_ID};
