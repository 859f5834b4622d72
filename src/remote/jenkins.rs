//! Jenkins REST binding over `ureq`
//!
//! `ureq` is blocking, so every call runs on tokio's blocking pool. HTTP
//! statuses are never turned into transport errors by the agent; they are
//! classified here instead.

use super::model::{BuildMetadata, Catalog, CatalogItem, JobMetadata, QueueItem};
use super::RemoteClient;
use crate::config::schema::JenkinsConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::hierarchy::MAX_LISTING_DEPTH;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use ureq::http::Response;
use ureq::{Agent, Body, RequestBuilder};

/// Folder levels requested in one catalog request
pub const MAX_CATALOG_LEVELS: usize = MAX_LISTING_DEPTH + 1;

/// Follow-up rounds for folders cut off at the last requested level.
///
/// The snapshot covers `MAX_CATALOG_LEVELS * MAX_CATALOG_ROUNDS` levels, so a
/// listing rooted up to that depth minus [`MAX_LISTING_DEPTH`] sees its full
/// bound.
pub const MAX_CATALOG_ROUNDS: usize = 4;

/// Everything but RFC 3986 unreserved characters
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Read limit for JSON payloads
const JSON_LIMIT_BYTES: u64 = 16 * 1024 * 1024;

/// Read limit for console text
const CONSOLE_LIMIT_BYTES: u64 = 64 * 1024 * 1024;

/// Jenkins client holding one connection agent
#[derive(Clone)]
pub struct JenkinsClient {
    agent: Agent,
    base_url: String,
    auth: Option<String>,
}

impl std::fmt::Debug for JenkinsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JenkinsClient")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth.as_ref().map(|_| "<basic>"))
            .finish()
    }
}

/// What a call does, for error messages
struct Target {
    action: &'static str,
    subject: String,
}

impl Target {
    fn new(action: &'static str, subject: impl Into<String>) -> Self {
        Self {
            action,
            subject: subject.into(),
        }
    }

    fn context(&self) -> String {
        format!("{} {}", self.action, self.subject)
    }
}

impl JenkinsClient {
    /// Create a client from connection settings
    pub fn new(config: &JenkinsConfig) -> GatewayResult<Self> {
        let base = config
            .url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                GatewayError::NotConfigured("no Jenkins URL in config or JENKINS_URL".to_string())
            })?;

        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(GatewayError::NotConfigured(format!(
                "Jenkins URL must start with http:// or https://, got '{}'",
                base
            )));
        }

        let auth = match (&config.user, &config.api_token) {
            (Some(user), Some(token)) => Some(format!(
                "Basic {}",
                STANDARD.encode(format!("{}:{}", user, token))
            )),
            _ => None,
        };

        let agent_config = Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .http_status_as_error(false)
            .build();

        Ok(Self {
            agent: Agent::new_with_config(agent_config),
            base_url: base.trim_end_matches('/').to_string(),
            auth,
        })
    }

    /// Base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorize<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        match &self.auth {
            Some(auth) => request.header("Authorization", auth.as_str()),
            None => request,
        }
    }

    fn get_bytes(
        &self,
        url: &str,
        query: &[(&str, &str)],
        target: &Target,
        limit: u64,
    ) -> GatewayResult<Vec<u8>> {
        debug!("GET {}", url);
        let mut request = self.authorize(self.agent.get(url));
        for (key, value) in query {
            request = request.query(*key, *value);
        }
        let response = request
            .call()
            .map_err(|e| transport_error(target, e))?;
        read_success(response, target, limit)
    }

    fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        target: &Target,
    ) -> GatewayResult<T> {
        let body = self.get_bytes(url, query, target, JSON_LIMIT_BYTES)?;
        serde_json::from_slice(&body).map_err(|e| GatewayError::malformed(target.context(), e.to_string()))
    }

    fn catalog(&self) -> GatewayResult<Catalog> {
        let target = Target::new("fetching", "job catalog");
        let tree = catalog_tree(MAX_CATALOG_LEVELS);

        let mut items = Vec::new();
        // Root first, then folders whose children the previous round did not reach
        let mut frontier = vec![String::new()];
        for round in 0..MAX_CATALOG_ROUNDS {
            if frontier.is_empty() {
                break;
            }
            if round > 0 {
                debug!("Catalog round {}: {} folders below the cut", round + 1, frontier.len());
            }

            let mut next = Vec::new();
            for folder in &frontier {
                let url = format!("{}api/json", job_url(&self.base_url, folder));
                let node: WireNode = self.get_json(&url, &[("tree", tree.as_str())], &target)?;
                let parent = (!folder.is_empty()).then_some(folder.as_str());
                flatten(node.jobs, parent, 1, &mut items, &mut next);
            }
            frontier = next;
        }

        if !frontier.is_empty() {
            warn!(
                "Catalog truncated: {} folders lie deeper than {} levels",
                frontier.len(),
                MAX_CATALOG_LEVELS * MAX_CATALOG_ROUNDS
            );
        }
        debug!("Catalog snapshot holds {} items", items.len());
        Ok(Catalog::from_items(items))
    }

    fn job(&self, job_path: &str) -> GatewayResult<JobMetadata> {
        let target = Target::new("fetching", format!("job '{}'", job_path));
        let url = format!("{}api/json", job_url(&self.base_url, job_path));
        self.get_json(&url, &[], &target)
    }

    fn build(&self, job_path: &str, number: u64) -> GatewayResult<BuildMetadata> {
        let target = Target::new("fetching", format!("build #{} of job '{}'", number, job_path));
        let url = format!("{}{}/api/json", job_url(&self.base_url, job_path), number);
        self.get_json(&url, &[], &target)
    }

    fn console(&self, job_path: &str, number: u64) -> GatewayResult<String> {
        let target = Target::new(
            "fetching",
            format!("console of build #{} of job '{}'", number, job_path),
        );
        let url = self.console_url(job_path, number);
        let body = self.get_bytes(&url, &[], &target, CONSOLE_LIMIT_BYTES)?;
        // Consoles are not always UTF-8
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn trigger(
        &self,
        job_path: &str,
        parameters: &BTreeMap<String, String>,
    ) -> GatewayResult<QueueItem> {
        let target = Target::new("triggering", format!("job '{}'", job_path));
        let job = job_url(&self.base_url, job_path);

        let sent = if parameters.is_empty() {
            let url = format!("{}build", job);
            debug!("POST {}", url);
            self.authorize(self.agent.post(&url)).send_empty()
        } else {
            let url = format!("{}buildWithParameters", job);
            debug!("POST {} ({} parameters)", url, parameters.len());
            self.authorize(self.agent.post(&url))
                .send_form(parameters.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        };
        let response = sent.map_err(|e| transport_error(&target, e))?;

        let location = response
            .headers()
            .get("location")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        read_success(response, &target, JSON_LIMIT_BYTES)?;
        Ok(QueueItem::from_location(location.as_deref()))
    }

    fn create(&self, job_path: &str, config_xml: &str) -> GatewayResult<()> {
        let target = Target::new("creating", format!("job '{}'", job_path));
        let (parent, leaf) = match job_path.rsplit_once('/') {
            Some((parent, leaf)) => (parent, leaf),
            None => ("", job_path),
        };
        let url = format!("{}createItem", job_url(&self.base_url, parent));
        debug!("POST {} name={}", url, leaf);

        let response = self
            .authorize(self.agent.post(&url))
            .query("name", leaf)
            .header("Content-Type", "application/xml")
            .send(config_xml)
            .map_err(|e| transport_error(&target, e))?;
        read_success(response, &target, JSON_LIMIT_BYTES).map(|_| ())
    }

    fn delete(&self, job_path: &str) -> GatewayResult<()> {
        let target = Target::new("deleting", format!("job '{}'", job_path));
        let url = format!("{}doDelete", job_url(&self.base_url, job_path));
        debug!("POST {}", url);

        let response = self
            .authorize(self.agent.post(&url))
            .send_empty()
            .map_err(|e| transport_error(&target, e))?;
        read_success(response, &target, JSON_LIMIT_BYTES).map(|_| ())
    }

    fn exists(&self, job_path: &str) -> GatewayResult<bool> {
        let target = Target::new("checking", format!("job '{}'", job_path));
        let url = format!("{}api/json", job_url(&self.base_url, job_path));
        match self.get_bytes(&url, &[("tree", "name")], &target, JSON_LIMIT_BYTES) {
            Ok(_) => Ok(true),
            Err(GatewayError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn me(&self) -> GatewayResult<String> {
        let target = Target::new("fetching", "current user");
        let url = format!("{}/me/api/json", self.base_url);
        let me: WireUser = self.get_json(&url, &[], &target)?;
        Ok(me
            .id
            .or(me.full_name)
            .unwrap_or_else(|| "anonymous".to_string()))
    }
}

#[async_trait]
impl RemoteClient for JenkinsClient {
    async fn fetch_full_catalog(&self) -> GatewayResult<Catalog> {
        let client = self.clone();
        blocking(move || client.catalog()).await
    }

    async fn fetch_job_metadata(&self, job_path: &str) -> GatewayResult<JobMetadata> {
        let client = self.clone();
        let job_path = job_path.to_string();
        blocking(move || client.job(&job_path)).await
    }

    async fn fetch_build_metadata(
        &self,
        job_path: &str,
        number: u64,
    ) -> GatewayResult<BuildMetadata> {
        let client = self.clone();
        let job_path = job_path.to_string();
        blocking(move || client.build(&job_path, number)).await
    }

    async fn fetch_console_text(&self, job_path: &str, number: u64) -> GatewayResult<String> {
        let client = self.clone();
        let job_path = job_path.to_string();
        blocking(move || client.console(&job_path, number)).await
    }

    async fn trigger_build(
        &self,
        job_path: &str,
        parameters: &BTreeMap<String, String>,
    ) -> GatewayResult<QueueItem> {
        let client = self.clone();
        let job_path = job_path.to_string();
        let parameters = parameters.clone();
        blocking(move || client.trigger(&job_path, &parameters)).await
    }

    async fn create_job(&self, job_path: &str, config_xml: &str) -> GatewayResult<()> {
        let client = self.clone();
        let job_path = job_path.to_string();
        let config_xml = config_xml.to_string();
        blocking(move || client.create(&job_path, &config_xml)).await
    }

    async fn delete_job(&self, job_path: &str) -> GatewayResult<()> {
        let client = self.clone();
        let job_path = job_path.to_string();
        blocking(move || client.delete(&job_path)).await
    }

    async fn job_exists(&self, job_path: &str) -> GatewayResult<bool> {
        let client = self.clone();
        let job_path = job_path.to_string();
        blocking(move || client.exists(&job_path)).await
    }

    async fn whoami(&self) -> GatewayResult<String> {
        let client = self.clone();
        blocking(move || client.me()).await
    }

    fn console_url(&self, job_path: &str, number: u64) -> String {
        format!("{}{}/consoleText", job_url(&self.base_url, job_path), number)
    }
}

/// Run a blocking HTTP exchange on the blocking pool
async fn blocking<T, F>(f: F) -> GatewayResult<T>
where
    F: FnOnce() -> GatewayResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| GatewayError::Internal(format!("remote call worker failed: {}", e)))?
}

/// URL of a job: `{base}/job/{a}/job/{b}/`, segments percent-encoded
pub fn job_url(base: &str, job_path: &str) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    for segment in job_path.split('/').filter(|s| !s.is_empty()) {
        url.push_str("/job/");
        url.push_str(&encode_segment(segment));
    }
    url.push('/');
    url
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Nested `tree` selector reaching `levels` folder levels
fn catalog_tree(levels: usize) -> String {
    const FIELDS: &str = "fullName,name,url,_class";
    let mut tree = FIELDS.to_string();
    for _ in 1..levels {
        tree = format!("{},jobs[{}]", FIELDS, tree);
    }
    format!("jobs[{}]", tree)
}

#[derive(Debug, Deserialize)]
struct WireNode {
    #[serde(default)]
    jobs: Vec<WireJob>,
}

#[derive(Debug, Deserialize)]
struct WireJob {
    #[serde(rename = "fullName", default)]
    full_name: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    url: String,
    #[serde(rename = "_class", default)]
    class: String,
    #[serde(default)]
    jobs: Vec<WireJob>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireUser {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    full_name: Option<String>,
}

/// Flatten one catalog response in preorder.
///
/// Folders at the last requested level are pushed onto `cut` so their
/// children can be fetched separately.
fn flatten(
    jobs: Vec<WireJob>,
    parent: Option<&str>,
    level: usize,
    out: &mut Vec<CatalogItem>,
    cut: &mut Vec<String>,
) {
    for job in jobs {
        let path = job.full_name.or_else(|| {
            job.name.map(|name| match parent {
                Some(parent) => format!("{}/{}", parent, name),
                None => name,
            })
        });
        let Some(path) = path else {
            warn!("Dropping catalog row without a name (url: {})", job.url);
            continue;
        };

        match CatalogItem::new(path.clone(), job.url, job.class) {
            Some(item) => {
                if item.is_folder && level == MAX_CATALOG_LEVELS {
                    cut.push(path.clone());
                }
                out.push(item);
            }
            None => warn!("Dropping catalog row with malformed path '{}'", path),
        }
        flatten(job.jobs, Some(&path), level + 1, out, cut);
    }
}

/// Body of a 2xx response, at most `limit` bytes
fn read_success(mut response: Response<Body>, target: &Target, limit: u64) -> GatewayResult<Vec<u8>> {
    let status = response.status().as_u16();
    if (200..300).contains(&status) {
        return response
            .body_mut()
            .with_config()
            .limit(limit)
            .read_to_vec()
            .map_err(|e| transport_error(target, e));
    }

    let body = response
        .body_mut()
        .with_config()
        .limit(JSON_LIMIT_BYTES)
        .read_to_vec()
        .unwrap_or_default();
    Err(status_error(status, target, &String::from_utf8_lossy(&body)))
}

/// Only failures of the exchange itself are worth another attempt
fn transport_error(target: &Target, error: ureq::Error) -> GatewayError {
    match error {
        ureq::Error::StatusCode(status) => status_error(status, target, ""),
        ureq::Error::BodyExceedsLimit(limit) => GatewayError::malformed(
            target.context(),
            format!("response body exceeds {} bytes", limit),
        ),
        other => GatewayError::transient(target.context(), other.to_string()),
    }
}

/// Classify a non-2xx status
fn status_error(status: u16, target: &Target, body: &str) -> GatewayError {
    match status {
        404 => GatewayError::NotFound(target.subject.clone()),
        401 | 403 => GatewayError::Unauthorized(format!("{} (HTTP {})", target.context(), status)),
        408 | 429 | 500..=599 => GatewayError::transient(target.context(), format!("HTTP {}", status)),
        _ => GatewayError::Remote {
            status,
            context: target.context(),
            message: first_line(body),
        },
    }
}

fn first_line(body: &str) -> String {
    let line = body.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    line.chars().take(200).collect()
}
