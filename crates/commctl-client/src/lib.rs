//! # commctl-client
//!
//! Resilient REST client for the Commissaire cluster-orchestration API.
//!
//! [`ApiClient`] wraps `reqwest` with the behavior every commctl command
//! relies on: base-URL construction from the resolved [`SessionConfig`],
//! basic or bearer authentication, bounded timeouts, retry with
//! exponential backoff for transient failures, and translation of HTTP
//! and transport outcomes into the typed [`ApiError`] taxonomy.
//!
//! ```text
//! ┌─────────┐      REST (/api/v0)      ┌──────────────┐
//! │ commctl │◄────────────────────────►│  Commissaire │
//! └─────────┘      HTTP(S) + auth      └──────────────┘
//! ```
//!
//! [`SessionConfig`]: commctl_config::SessionConfig

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod models;

pub use client::{ApiClient, ApiResult, MAX_ATTEMPTS, ResponseBody};
pub use error::ApiError;
pub use models::{Cluster, ClusterSpec, ClusterStatus, Host, HostSpec, HostStatus};
