//! CI platform detection
//!
//! Figures out which CI system the command runs under and collects the
//! metadata notifications link back to (commit, build URL, pull request).

use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CiPlatform {
    GitHubActions,
    GitLabCi,
    Jenkins,
    CircleCi,
    Local,
}

impl CiPlatform {
    pub fn from_name(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "github" | "github-actions" => Ok(Self::GitHubActions),
            "gitlab" | "gitlab-ci" => Ok(Self::GitLabCi),
            "jenkins" => Ok(Self::Jenkins),
            "circleci" => Ok(Self::CircleCi),
            "local" | "none" => Ok(Self::Local),
            _ => anyhow::bail!("Unsupported CI platform: {}", s),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CiPlatform::GitHubActions => "github-actions",
            CiPlatform::GitLabCi => "gitlab-ci",
            CiPlatform::Jenkins => "jenkins",
            CiPlatform::CircleCi => "circleci",
            CiPlatform::Local => "local",
        }
    }

    /// Detect the platform from well-known environment variables
    pub fn detect<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_set = |key: &str| lookup(key).is_some_and(|v| !v.is_empty());

        if lookup("GITHUB_ACTIONS").as_deref() == Some("true") {
            Self::GitHubActions
        } else if is_set("GITLAB_CI") {
            Self::GitLabCi
        } else if is_set("JENKINS_URL") {
            Self::Jenkins
        } else if is_set("CIRCLECI") {
            Self::CircleCi
        } else {
            Self::Local
        }
    }
}

/// Metadata about the CI run a notification belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CiInfo {
    pub platform: CiPlatform,
    pub name: String,
    pub sha: Option<String>,
    pub link: Option<String>,
    pub pr_number: Option<u64>,
}

impl CiInfo {
    /// Collect CI metadata, preferring `configured` over auto-detection
    pub fn resolve<F>(configured: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let platform = match configured {
            Some(name) => CiPlatform::from_name(name)?,
            None => CiPlatform::detect(&lookup),
        };

        Ok(Self::for_platform(platform, lookup))
    }

    /// Collect CI metadata from the process environment
    pub fn from_env(configured: Option<&str>) -> Result<Self> {
        Self::resolve(configured, |key| std::env::var(key).ok())
    }

    fn for_platform<F>(platform: CiPlatform, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let number = |key: &str| var(key).and_then(|v| v.parse::<u64>().ok());

        let (sha, link, pr_number) = match platform {
            CiPlatform::GitHubActions => {
                let link = match (var("GITHUB_REPOSITORY"), var("GITHUB_RUN_ID")) {
                    (Some(repo), Some(run_id)) => {
                        let server =
                            var("GITHUB_SERVER_URL").unwrap_or_else(|| "https://github.com".to_string());
                        Some(format!("{}/{}/actions/runs/{}", server, repo, run_id))
                    }
                    _ => None,
                };
                let pr_number = var("GITHUB_REF").and_then(|r| github_pr_number(&r));
                (var("GITHUB_SHA"), link, pr_number)
            }
            CiPlatform::GitLabCi => (
                var("CI_COMMIT_SHA"),
                var("CI_JOB_URL"),
                number("CI_MERGE_REQUEST_IID"),
            ),
            CiPlatform::Jenkins => (var("GIT_COMMIT"), var("BUILD_URL"), number("CHANGE_ID")),
            CiPlatform::CircleCi => (
                var("CIRCLE_SHA1"),
                var("CIRCLE_BUILD_URL"),
                number("CIRCLE_PR_NUMBER"),
            ),
            CiPlatform::Local => (None, None, None),
        };

        Self {
            platform,
            name: platform.name().to_string(),
            sha,
            link,
            pr_number,
        }
    }
}

/// `refs/pull/42/merge` -> 42
fn github_pr_number(git_ref: &str) -> Option<u64> {
    git_ref
        .strip_prefix("refs/pull/")?
        .split('/')
        .next()?
        .parse()
        .ok()
}
