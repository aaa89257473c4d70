//! regstat notification server
//!
//! This crate turns registry notifications into audit records.
//!
//! # Overview
//!
//! - **Listener**: accepts notification posts, acknowledges them at once and
//!   processes them in the background ([`Server`])
//! - **Dispatch**: decodes an envelope and routes each event by action
//!   ([`Dispatcher`])
//! - **Workflow**: reconciles one event into the audit store, enriching
//!   manifest pushes with the blobs they reference ([`Workflow`])
//!
//! # Architecture
//!
//! ```text
//!  registry ──POST──▶ Server ──spawn──▶ Dispatcher ──▶ Workflow ──▶ AuditStore
//!                       │                                 │
//!                   200 OK                                ▼
//!                                                  RegistryClient
//!                                                  (manifest fetch)
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use regstat_audit::SqliteStore;
//! use regstat_registry::{EquivalentRegistries, RegistryClient, RegistryConfig};
//! use regstat_server::{Dispatcher, Server, ServerConfig, Workflow};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(SqliteStore::in_memory().await?);
//! let client = Arc::new(RegistryClient::new(RegistryConfig::new())?);
//! let workflow = Workflow::new(store.clone(), client, EquivalentRegistries::new());
//!
//! let server = Server::new(
//!     ServerConfig::default(),
//!     Dispatcher::new(Arc::new(workflow)),
//!     store,
//! )?;
//! server.run_until_shutdown().await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::significant_drop_tightening)]

pub mod config;
pub mod dispatch;
pub mod error;
pub mod server;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use config::{ServerConfig, DEFAULT_MAX_IN_FLIGHT, DEFAULT_PORT};
pub use dispatch::{DispatchSummary, Dispatcher};
pub use error::{Result, ServerError, WorkflowError};
pub use server::{router, AppState, HealthResponse, Server, ServerHandle};
pub use workflow::{EventHandler, Outcome, Workflow};
