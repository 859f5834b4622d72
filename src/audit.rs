//! Audit trail for mutating operations
//!
//! Writes JSON lines to `{state_dir}/audit.log`. Every successful trigger,
//! create and delete is recorded; write failures are logged and dropped.

use crate::config::{schema::Config, ConfigManager};
use chrono::Utc;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;
use uuid::Uuid;

/// Mutation recorded in the audit trail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent<'a> {
    BuildTriggered {
        job_path: &'a str,
        parameters: &'a BTreeMap<String, String>,
        queue_id: Option<u64>,
    },
    JobCreated {
        job_path: &'a str,
    },
    FolderCreated {
        folder_path: &'a str,
    },
    JobDeleted {
        job_path: &'a str,
    },
}

impl AuditEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::BuildTriggered { .. } => "build.triggered",
            Self::JobCreated { .. } => "job.created",
            Self::FolderCreated { .. } => "folder.created",
            Self::JobDeleted { .. } => "job.deleted",
        }
    }

    fn data(&self) -> serde_json::Value {
        match self {
            Self::BuildTriggered {
                job_path,
                parameters,
                queue_id,
            } => json!({
                "job_path": job_path,
                // Values may carry secrets; names are enough for the trail
                "parameters": parameters.keys().collect::<Vec<_>>(),
                "queue_id": queue_id,
            }),
            Self::JobCreated { job_path } | Self::JobDeleted { job_path } => {
                json!({ "job_path": job_path })
            }
            Self::FolderCreated { folder_path } => json!({ "folder_path": folder_path }),
        }
    }
}

/// File-based audit logger that appends JSON lines
#[derive(Debug, Clone)]
pub struct AuditLog {
    enabled: bool,
    path: PathBuf,
}

impl AuditLog {
    /// Create a new audit logger from config
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.audit_log,
            path: ConfigManager::audit_log_path(),
        }
    }

    /// Audit logger writing to an explicit file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            path: path.into(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            path: PathBuf::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record one event
    pub async fn record(&self, event: &AuditEvent<'_>) {
        if !self.enabled {
            return;
        }

        let entry = json!({
            "id": Uuid::new_v4(),
            "timestamp": Utc::now().to_rfc3339(),
            "event": event.name(),
            "data": event.data(),
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize audit event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write audit log {}: {}", self.path.display(), e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
