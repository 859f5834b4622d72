//! Build identifier resolution
//!
//! Turns a raw build token into a concrete build number. Numeric tokens are
//! returned as-is without touching the remote server; symbolic keywords are
//! looked up on the job's metadata. Any other shape is rejected before any
//! I/O happens.

use crate::error::{GatewayError, GatewayResult};
use crate::remote::{BuildPointer, JobMetadata};
use serde::Serialize;
use std::fmt;
use std::future::Future;

/// Symbolic build references understood by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SymbolicBuild {
    LastBuild,
    LastSuccessfulBuild,
    LastCompletedBuild,
    LastFailedBuild,
    LastStableBuild,
}

impl SymbolicBuild {
    /// All keywords in lookup order
    pub fn all() -> &'static [Self] {
        &[
            Self::LastBuild,
            Self::LastSuccessfulBuild,
            Self::LastCompletedBuild,
            Self::LastFailedBuild,
            Self::LastStableBuild,
        ]
    }

    /// Accepted spellings; the first one is the Jenkins field name
    fn spellings(self) -> &'static [&'static str] {
        match self {
            Self::LastBuild => &["lastBuild", "latest", "most-recent"],
            Self::LastSuccessfulBuild => &["lastSuccessfulBuild", "most-recent-successful"],
            Self::LastCompletedBuild => &["lastCompletedBuild", "most-recent-completed"],
            Self::LastFailedBuild => &["lastFailedBuild", "most-recent-failed"],
            Self::LastStableBuild => &["lastStableBuild", "most-recent-stable"],
        }
    }

    /// Jenkins job metadata field holding this pointer
    pub fn field_name(self) -> &'static str {
        self.spellings()[0]
    }

    /// Parse a keyword in any accepted spelling
    pub fn parse(token: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kw| kw.spellings().contains(&token))
    }

    /// Look the pointer up on job metadata
    pub fn pointer(self, job: &JobMetadata) -> Option<&BuildPointer> {
        match self {
            Self::LastBuild => job.last_build.as_ref(),
            Self::LastSuccessfulBuild => job.last_successful_build.as_ref(),
            Self::LastCompletedBuild => job.last_completed_build.as_ref(),
            Self::LastFailedBuild => job.last_failed_build.as_ref(),
            Self::LastStableBuild => job.last_stable_build.as_ref(),
        }
    }

    fn expected() -> String {
        Self::all()
            .iter()
            .map(|kw| kw.field_name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for SymbolicBuild {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// A parsed build token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildToken {
    Number(u64),
    Symbolic(SymbolicBuild),
}

impl BuildToken {
    /// Parse a raw token; no remote call is involved
    pub fn parse(job_path: &str, token: &str) -> GatewayResult<Self> {
        let token = token.trim();
        if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(number) = token.parse() {
                return Ok(Self::Number(number));
            }
        }

        SymbolicBuild::parse(token)
            .map(Self::Symbolic)
            .ok_or_else(|| GatewayError::InvalidIdentifierFormat {
                job_path: job_path.to_string(),
                token: token.to_string(),
                expected: SymbolicBuild::expected(),
            })
    }
}

/// How a build number was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "keyword", rename_all = "snake_case")]
pub enum BuildOrigin {
    Literal,
    Keyword(SymbolicBuild),
}

/// A concrete build of a job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedBuild {
    pub job_path: String,
    pub number: u64,
    pub origin: BuildOrigin,
}

/// Resolve `token` for `job_path`.
///
/// `fetch_job` is only awaited for symbolic tokens; callers pass the
/// resilience-wrapped metadata fetch.
pub async fn resolve<F, Fut>(job_path: &str, token: &str, fetch_job: F) -> GatewayResult<ResolvedBuild>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = GatewayResult<JobMetadata>>,
{
    let keyword = match BuildToken::parse(job_path, token)? {
        BuildToken::Number(number) => {
            return Ok(ResolvedBuild {
                job_path: job_path.to_string(),
                number,
                origin: BuildOrigin::Literal,
            })
        }
        BuildToken::Symbolic(keyword) => keyword,
    };

    let job = fetch_job().await?;
    let number = keyword
        .pointer(&job)
        .and_then(|pointer| pointer.number)
        .ok_or_else(|| GatewayError::UnresolvableIdentifier {
            job_path: job_path.to_string(),
            token: token.trim().to_string(),
        })?;

    Ok(ResolvedBuild {
        job_path: job_path.to_string(),
        number,
        origin: BuildOrigin::Keyword(keyword),
    })
}
