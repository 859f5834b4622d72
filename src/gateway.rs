//! Gateway operations
//!
//! Composes the remote client with the cache, the resilience wrapper, the
//! hierarchy and build identifier resolvers and the log summarizer. Every
//! remote call made here goes through [`Resilience`]; every read that has a
//! cache scope goes through it.

use crate::audit::{AuditEvent, AuditLog};
use crate::build_ref::{self, BuildOrigin, ResolvedBuild};
use crate::cache::{builds_key, status_key, Cached, GatewayCache, GatewayCacheStats};
use crate::config::{Config, GatewayConfig};
use crate::error::{GatewayError, GatewayResult};
use crate::hierarchy::{self, ListingQuery};
use crate::logs::{self, LogSummary, SummaryLimits};
use crate::remote::{
    BuildMetadata, Catalog, CatalogItem, JenkinsClient, JobMetadata, QueueItem, RemoteClient,
};
use crate::resilience::{CallClass, Resilience};
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Config document for an empty folder
pub const FOLDER_CONFIG_XML: &str = r#"<?xml version='1.1' encoding='UTF-8'?>
<com.cloudbees.hudson.plugins.folder.Folder plugin="cloudbees-folder">
  <description></description>
  <properties/>
  <folderViews class="com.cloudbees.hudson.plugins.folder.views.DefaultFolderViewHolder">
    <views>
      <hudson.model.AllView>
        <owner class="com.cloudbees.hudson.plugins.folder.Folder" reference="../../../.."/>
        <name>All</name>
        <filterExecutors>false</filterExecutors>
        <filterQueue>false</filterQueue>
        <properties class="hudson.model.View$PropertyList"/>
      </hudson.model.AllView>
    </views>
    <tabBar class="hudson.views.DefaultViewsTabBar"/>
  </folderViews>
  <healthMetrics/>
</com.cloudbees.hudson.plugins.folder.Folder>
"#;

/// Status of one resolved build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildStatus {
    pub job_path: String,
    pub origin: BuildOrigin,
    #[serde(flatten)]
    pub build: BuildMetadata,
}

/// Summary of a build's console output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogDigest {
    pub job_path: String,
    pub number: u64,
    pub origin: BuildOrigin,
    /// Where the full text can be fetched
    pub console_url: String,
    pub summary: LogSummary,
}

/// A queued build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggeredBuild {
    pub job_path: String,
    pub parameters: BTreeMap<String, String>,
    pub queue: QueueItem,
}

/// Connectivity and cache report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub remote_user: String,
    pub cache: GatewayCacheStats,
}

/// Normalize a job path: outer `/` stripped, no empty segments
pub fn normalize_job_path(raw: &str) -> GatewayResult<String> {
    let path = raw.trim().trim_matches('/');
    if path.is_empty() {
        return Err(GatewayError::Validation("job path is empty".to_string()));
    }
    if path.split('/').any(|segment| segment.trim().is_empty()) {
        return Err(GatewayError::Validation(format!(
            "job path '{}' contains an empty segment",
            raw
        )));
    }
    if path.split('/').any(|segment| segment == "." || segment == "..") {
        return Err(GatewayError::Validation(format!(
            "job path '{}' contains a relative segment",
            raw
        )));
    }
    Ok(path.to_string())
}

/// Jenkins gateway
pub struct Gateway {
    remote: Arc<dyn RemoteClient>,
    cache: GatewayCache<BuildMetadata, BuildStatus>,
    resilience: Resilience,
    settings: GatewayConfig,
    audit: AuditLog,
}

impl Gateway {
    /// Create a gateway over any remote client
    pub fn new(remote: Arc<dyn RemoteClient>, config: &Config) -> Self {
        Self {
            remote,
            cache: GatewayCache::from_config(&config.cache),
            resilience: Resilience::from_config(&config.retry, &config.rate_limit),
            settings: config.gateway.clone(),
            audit: AuditLog::new(config),
        }
    }

    /// Create a gateway talking to the configured Jenkins server
    pub fn from_config(config: &Config) -> GatewayResult<Self> {
        let client = JenkinsClient::new(&config.jenkins)?;
        Ok(Self::new(Arc::new(client), config))
    }

    /// Replace the audit trail destination
    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = audit;
        self
    }

    /// Replace the resilience wrapper
    pub fn with_resilience(mut self, resilience: Resilience) -> Self {
        self.resilience = resilience;
        self
    }

    pub fn cache(&self) -> &GatewayCache<BuildMetadata, BuildStatus> {
        &self.cache
    }

    /// List jobs and folders under `folder_prefix` (root when `None`)
    pub async fn list_jobs(
        &self,
        folder_prefix: Option<&str>,
        recursive: bool,
    ) -> GatewayResult<Cached<Vec<CatalogItem>>> {
        let query = ListingQuery::new(folder_prefix, recursive);
        self.cache
            .listings
            .get_or_compute(&query.cache_key(), || self.fetch_listing(&query))
            .await
    }

    async fn fetch_listing(&self, query: &ListingQuery) -> GatewayResult<Vec<CatalogItem>> {
        let catalog = self.fetch_catalog().await?;
        let listing = hierarchy::resolve(&catalog, query);
        debug!(
            "Resolved {} of {} catalog items for {}",
            listing.len(),
            catalog.len(),
            query.cache_key()
        );
        Ok(listing)
    }

    /// Builds of a job, newest first, at most `gateway.max_builds`
    pub async fn list_builds(&self, job_path: &str) -> GatewayResult<Cached<Vec<BuildMetadata>>> {
        let job_path = normalize_job_path(job_path)?;
        self.cache
            .builds
            .get_or_compute(&builds_key(&job_path), || self.fetch_builds(&job_path))
            .await
    }

    async fn fetch_builds(&self, job_path: &str) -> GatewayResult<Vec<BuildMetadata>> {
        let job = self.fetch_job(job_path).await?;

        let mut numbers: Vec<u64> = job.builds.iter().filter_map(|b| b.number).collect();
        numbers.sort_unstable_by(|a, b| b.cmp(a));
        numbers.dedup();
        numbers.truncate(self.settings.max_builds);

        let fetched: Vec<(u64, GatewayResult<BuildMetadata>)> = stream::iter(numbers)
            .map(|number| async move { (number, self.fetch_build(job_path, number).await) })
            .buffered(self.settings.fetch_concurrency.max(1))
            .collect()
            .await;

        let mut builds = Vec::with_capacity(fetched.len());
        for (number, result) in fetched {
            match result {
                Ok(build) => builds.push(build),
                // Rotated away between the job and build calls
                Err(GatewayError::NotFound(_)) => debug!("Build {} #{} vanished", job_path, number),
                Err(e) => return Err(e),
            }
        }
        Ok(builds)
    }

    /// Status of the build `token` names
    pub async fn get_build_status(
        &self,
        job_path: &str,
        token: &str,
    ) -> GatewayResult<Cached<BuildStatus>> {
        let job_path = normalize_job_path(job_path)?;
        let token = token.trim();
        self.cache
            .status
            .get_or_compute(&status_key(&job_path, token), || {
                self.fetch_status(&job_path, token)
            })
            .await
    }

    async fn fetch_status(&self, job_path: &str, token: &str) -> GatewayResult<BuildStatus> {
        let resolved = self.resolve_build(job_path, token).await?;
        let build = self.fetch_build(job_path, resolved.number).await?;
        Ok(BuildStatus {
            job_path: resolved.job_path,
            origin: resolved.origin,
            build,
        })
    }

    /// Summarize the console output of the build `token` names
    pub async fn get_build_log(&self, job_path: &str, token: &str) -> GatewayResult<LogDigest> {
        let job_path = normalize_job_path(job_path)?;
        let resolved = self.resolve_build(&job_path, token).await?;
        let number = resolved.number;

        let text = self
            .resilience
            .run(CallClass::Console, "fetch console text", || {
                self.remote.fetch_console_text(&job_path, number)
            })
            .await?;

        let summary = logs::summarize(&text, &self.summary_limits());
        debug!(
            "Summarized {} console lines of {} #{}",
            summary.total_lines, job_path, number
        );

        Ok(LogDigest {
            console_url: self.remote.console_url(&job_path, number),
            job_path,
            number,
            origin: resolved.origin,
            summary,
        })
    }

    /// Queue a build; the job must exist and be buildable
    pub async fn trigger_build(
        &self,
        job_path: &str,
        parameters: BTreeMap<String, String>,
    ) -> GatewayResult<TriggeredBuild> {
        let job_path = normalize_job_path(job_path)?;
        if parameters.keys().any(|name| name.trim().is_empty()) {
            return Err(GatewayError::Validation(
                "build parameter names must not be empty".to_string(),
            ));
        }

        let job = self.fetch_job(&job_path).await?;
        if !job.buildable {
            return Err(GatewayError::Validation(format!(
                "job '{}' is not buildable",
                job_path
            )));
        }

        let queue = self
            .resilience
            .run(CallClass::Mutation, "trigger build", || {
                self.remote.trigger_build(&job_path, &parameters)
            })
            .await?;
        self.cache.invalidate_job(&job_path);

        info!(
            "Triggered {} with {} parameters (queue item {:?})",
            job_path,
            parameters.len(),
            queue.id
        );
        self.audit
            .record(&AuditEvent::BuildTriggered {
                job_path: &job_path,
                parameters: &parameters,
                queue_id: queue.id,
            })
            .await;

        Ok(TriggeredBuild {
            job_path,
            parameters,
            queue,
        })
    }

    /// Create a job from a config document; fails if the path is taken
    pub async fn create_job(&self, job_path: &str, config_xml: &str) -> GatewayResult<()> {
        let job_path = normalize_job_path(job_path)?;
        if config_xml.trim().is_empty() {
            return Err(GatewayError::Validation(
                "job config document is empty".to_string(),
            ));
        }

        self.create_item(&job_path, config_xml).await?;
        info!("Created job {}", job_path);
        self.audit
            .record(&AuditEvent::JobCreated {
                job_path: &job_path,
            })
            .await;
        Ok(())
    }

    /// Create an empty folder; fails if the path is taken
    pub async fn create_folder(&self, folder_path: &str) -> GatewayResult<()> {
        let folder_path = normalize_job_path(folder_path)?;
        self.create_item(&folder_path, FOLDER_CONFIG_XML).await?;
        info!("Created folder {}", folder_path);
        self.audit
            .record(&AuditEvent::FolderCreated {
                folder_path: &folder_path,
            })
            .await;
        Ok(())
    }

    async fn create_item(&self, path: &str, config_xml: &str) -> GatewayResult<()> {
        let exists = self
            .resilience
            .run(CallClass::Metadata, "check job exists", || {
                self.remote.job_exists(path)
            })
            .await?;
        if exists {
            return Err(GatewayError::AlreadyExists(format!("job '{}'", path)));
        }

        self.resilience
            .run(CallClass::Mutation, "create job", || {
                self.remote.create_job(path, config_xml)
            })
            .await?;
        self.cache.invalidate_listings();
        Ok(())
    }

    /// Delete a job or folder
    pub async fn delete_job(&self, job_path: &str) -> GatewayResult<()> {
        let job_path = normalize_job_path(job_path)?;
        self.resilience
            .run(CallClass::Mutation, "delete job", || {
                self.remote.delete_job(&job_path)
            })
            .await?;
        self.cache.invalidate_listings();
        self.cache.invalidate_job(&job_path);

        info!("Deleted {}", job_path);
        self.audit
            .record(&AuditEvent::JobDeleted {
                job_path: &job_path,
            })
            .await;
        Ok(())
    }

    /// Check connectivity and credentials
    pub async fn health(&self) -> GatewayResult<HealthReport> {
        let remote_user = self
            .resilience
            .run(CallClass::Metadata, "check connectivity", || self.remote.whoami())
            .await?;
        Ok(HealthReport {
            remote_user,
            cache: self.cache.stats(),
        })
    }

    async fn resolve_build(&self, job_path: &str, token: &str) -> GatewayResult<ResolvedBuild> {
        build_ref::resolve(job_path, token, || self.fetch_job(job_path)).await
    }

    async fn fetch_catalog(&self) -> GatewayResult<Catalog> {
        self.resilience
            .run(CallClass::Metadata, "fetch catalog", || {
                self.remote.fetch_full_catalog()
            })
            .await
    }

    async fn fetch_job(&self, job_path: &str) -> GatewayResult<JobMetadata> {
        self.resilience
            .run(CallClass::Metadata, "fetch job metadata", || {
                self.remote.fetch_job_metadata(job_path)
            })
            .await
    }

    async fn fetch_build(&self, job_path: &str, number: u64) -> GatewayResult<BuildMetadata> {
        self.resilience
            .run(CallClass::Metadata, "fetch build metadata", || {
                self.remote.fetch_build_metadata(job_path, number)
            })
            .await
    }

    fn summary_limits(&self) -> SummaryLimits {
        SummaryLimits {
            head_lines: self.settings.log_head_lines,
            max_hits: self.settings.log_max_hits,
            ..Default::default()
        }
    }
}
