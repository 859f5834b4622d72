//! Typed payloads exchanged with the Jenkins server
//!
//! Wire shapes are decoded into these structs at the client boundary so the
//! core logic never handles loosely-typed JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of a full-catalog snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogItem {
    /// `/`-separated path, globally unique
    pub full_path: String,
    pub url: String,
    /// Remote class tag (`_class` in Jenkins)
    pub kind_hint: String,
    pub is_folder: bool,
}

impl CatalogItem {
    /// Build an item, deriving `is_folder` from the kind hint.
    ///
    /// Returns `None` when the path is empty, starts or ends with `/`, or
    /// contains an empty segment.
    pub fn new(
        full_path: impl Into<String>,
        url: impl Into<String>,
        kind_hint: impl Into<String>,
    ) -> Option<Self> {
        let full_path = full_path.into();
        if !is_valid_path(&full_path) {
            return None;
        }
        let kind_hint = kind_hint.into();
        Some(Self {
            is_folder: is_folder_kind(&kind_hint),
            full_path,
            url: url.into(),
            kind_hint,
        })
    }

    /// Last path segment
    pub fn name(&self) -> &str {
        self.full_path
            .rsplit_once('/')
            .map_or(self.full_path.as_str(), |(_, leaf)| leaf)
    }

    /// Parent folder path, `None` for top-level items
    pub fn parent(&self) -> Option<&str> {
        self.full_path.rsplit_once('/').map(|(parent, _)| parent)
    }
}

/// Whether a remote class tag denotes a folder-like container
pub fn is_folder_kind(kind_hint: &str) -> bool {
    let simple = kind_hint.rsplit('.').next().unwrap_or(kind_hint);
    simple.ends_with("Folder") || simple.contains("MultiBranchProject")
}

/// `true` when `path` is non-empty, has no outer `/` and no empty segment
pub fn is_valid_path(path: &str) -> bool {
    !path.is_empty() && path.split('/').all(|segment| !segment.is_empty())
}

/// One point-in-time snapshot of the entire remote hierarchy.
///
/// Only built from a complete item list obtained in a single remote call;
/// snapshots are never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    pub fn from_items(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Pointer from job metadata to one of its builds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPointer {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Job metadata, including symbolic build pointers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobMetadata {
    pub full_name: Option<String>,
    pub url: Option<String>,
    pub buildable: bool,
    pub color: Option<String>,
    pub builds: Vec<BuildPointer>,
    pub last_build: Option<BuildPointer>,
    pub last_successful_build: Option<BuildPointer>,
    pub last_completed_build: Option<BuildPointer>,
    pub last_failed_build: Option<BuildPointer>,
    pub last_stable_build: Option<BuildPointer>,
    pub next_build_number: Option<u64>,
}

/// Build metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildMetadata {
    pub number: u64,
    pub url: String,
    #[serde(default)]
    pub building: bool,
    /// `SUCCESS`, `FAILURE`, `ABORTED`, `UNSTABLE`, or absent while building
    #[serde(default)]
    pub result: Option<String>,
    /// Start time in milliseconds since the epoch
    #[serde(default)]
    pub timestamp: i64,
    /// Duration in milliseconds, 0 while building
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub estimated_duration: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub full_display_name: Option<String>,
}

impl BuildMetadata {
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }

    /// Result label, `BUILDING` while running and `UNKNOWN` when absent
    pub fn result_label(&self) -> &str {
        if self.building {
            "BUILDING"
        } else {
            self.result.as_deref().unwrap_or("UNKNOWN")
        }
    }
}

/// Queue entry created by a trigger
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueItem {
    pub id: Option<u64>,
    pub url: Option<String>,
}

impl QueueItem {
    /// Parse a queue location such as `https://ci/queue/item/42/`
    pub fn from_location(location: Option<&str>) -> Self {
        let id = location.and_then(|loc| {
            loc.trim_end_matches('/')
                .rsplit('/')
                .next()
                .and_then(|last| last.parse().ok())
        });
        Self {
            id,
            url: location.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_kinds_are_detected() {
        assert!(is_folder_kind("com.cloudbees.hudson.plugins.folder.Folder"));
        assert!(is_folder_kind("jenkins.branch.OrganizationFolder"));
        assert!(is_folder_kind(
            "org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProject"
        ));
        assert!(!is_folder_kind("hudson.model.FreeStyleProject"));
        assert!(!is_folder_kind("org.jenkinsci.plugins.workflow.job.WorkflowJob"));
    }

    #[test]
    fn invalid_paths_are_rejected() {
        assert!(CatalogItem::new("", "u", "k").is_none());
        assert!(CatalogItem::new("/a", "u", "k").is_none());
        assert!(CatalogItem::new("a/", "u", "k").is_none());
        assert!(CatalogItem::new("a//b", "u", "k").is_none());
        assert!(CatalogItem::new("a/b", "u", "k").is_some());
    }

    #[test]
    fn item_name_and_parent() {
        let item = CatalogItem::new("team/app/deploy", "u", "hudson.model.FreeStyleProject").unwrap();
        assert_eq!(item.name(), "deploy");
        assert_eq!(item.parent(), Some("team/app"));

        let top = CatalogItem::new("deploy", "u", "x").unwrap();
        assert_eq!(top.parent(), None);
    }

    #[test]
    fn job_metadata_decodes_jenkins_shape() {
        let json = r#"{
            "_class": "hudson.model.FreeStyleProject",
            "fullName": "team/app",
            "buildable": true,
            "builds": [{"number": 7, "url": "https://ci/job/team/job/app/7/"}],
            "lastBuild": {"number": 7, "url": "https://ci/job/team/job/app/7/"},
            "lastSuccessfulBuild": null,
            "nextBuildNumber": 8
        }"#;
        let job: JobMetadata = serde_json::from_str(json).unwrap();
        assert!(job.buildable);
        assert_eq!(job.last_build.and_then(|b| b.number), Some(7));
        assert!(job.last_successful_build.is_none());
        assert_eq!(job.next_build_number, Some(8));
    }

    #[test]
    fn build_metadata_labels() {
        let mut build = BuildMetadata {
            number: 3,
            url: "u".into(),
            building: true,
            ..Default::default()
        };
        assert_eq!(build.result_label(), "BUILDING");
        build.building = false;
        build.result = Some("FAILURE".into());
        assert_eq!(build.result_label(), "FAILURE");
    }

    #[test]
    fn queue_location_parses_id() {
        let item = QueueItem::from_location(Some("https://ci.example.com/queue/item/1234/"));
        assert_eq!(item.id, Some(1234));
        assert_eq!(QueueItem::from_location(None).id, None);
    }
}
