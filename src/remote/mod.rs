//! Remote build server abstraction
//!
//! Provides a trait for the calls the gateway makes against the build
//! server so the core can run against Jenkins or an in-memory fake.

mod jenkins;
pub mod model;

pub use jenkins::{job_url, JenkinsClient, MAX_CATALOG_LEVELS, MAX_CATALOG_ROUNDS};
pub use model::{
    BuildMetadata, BuildPointer, Catalog, CatalogItem, JobMetadata, QueueItem,
};

use crate::error::GatewayResult;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Abstract remote build server interface
///
/// Each method issues exactly one remote call. Failures are classified as
/// `NotFound`, `Unauthorized`, `Transient` or a non-retryable remote error.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Fetch a flat snapshot of every item in the hierarchy
    async fn fetch_full_catalog(&self) -> GatewayResult<Catalog>;

    /// Fetch one job's metadata
    async fn fetch_job_metadata(&self, job_path: &str) -> GatewayResult<JobMetadata>;

    /// Fetch one build's metadata
    async fn fetch_build_metadata(&self, job_path: &str, number: u64)
        -> GatewayResult<BuildMetadata>;

    /// Fetch the full console text of a build
    async fn fetch_console_text(&self, job_path: &str, number: u64) -> GatewayResult<String>;

    /// Queue a build, returning the queue entry
    async fn trigger_build(
        &self,
        job_path: &str,
        parameters: &BTreeMap<String, String>,
    ) -> GatewayResult<QueueItem>;

    /// Create a job (or folder) from a config document
    async fn create_job(&self, job_path: &str, config_xml: &str) -> GatewayResult<()>;

    /// Delete a job or folder
    async fn delete_job(&self, job_path: &str) -> GatewayResult<()>;

    /// Check whether a job or folder exists
    async fn job_exists(&self, job_path: &str) -> GatewayResult<bool>;

    /// Name of the authenticated user, used as a connectivity check
    async fn whoami(&self) -> GatewayResult<String>;

    /// URL of a build's full console text
    fn console_url(&self, job_path: &str, number: u64) -> String;
}
