//! Access control decisions.
//!
//! A pure function of a classification, the target URL and one snapshot.
//! GitHub resources are checked against the compiled owner/repo lists;
//! everything else against the proxy-all switch and the substring lists.

use std::fmt;

use crate::config::ConfigSnapshot;
use crate::routing::Classification;
use crate::security::patterns::ListPattern;

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    GitHubBlacklisted,
    GitHubNotWhitelisted,
    ProxyAllDisabled,
    OtherBlacklisted,
    OtherNotWhitelisted,
}

impl DenyReason {
    /// Short label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::GitHubBlacklisted => "github_blacklisted",
            DenyReason::GitHubNotWhitelisted => "github_not_whitelisted",
            DenyReason::ProxyAllDisabled => "proxy_all_disabled",
            DenyReason::OtherBlacklisted => "other_blacklisted",
            DenyReason::OtherNotWhitelisted => "other_not_whitelisted",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self {
            DenyReason::GitHubBlacklisted => "This GitHub repository is blacklisted",
            DenyReason::GitHubNotWhitelisted => "This GitHub repository is not whitelisted",
            DenyReason::ProxyAllDisabled => {
                "Invalid URL: proxying non-GitHub addresses is disabled"
            }
            DenyReason::OtherBlacklisted => "This address is blacklisted",
            DenyReason::OtherNotWhitelisted => "This address is not whitelisted",
        };
        f.write_str(message)
    }
}

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

/// Decide whether `url`, classified as `classification`, may be proxied.
pub fn decide(classification: &Classification, url: &str, snapshot: &ConfigSnapshot) -> Decision {
    match classification {
        Classification::GitHub(resource) => {
            let hit = |list: &[ListPattern]| {
                list.iter()
                    .any(|pattern| pattern.matches(&resource.owner, &resource.repo))
            };
            if !snapshot.github_black_list.is_empty() && hit(&snapshot.github_black_list) {
                Decision::Deny(DenyReason::GitHubBlacklisted)
            } else if !snapshot.github_white_list.is_empty() && !hit(&snapshot.github_white_list) {
                Decision::Deny(DenyReason::GitHubNotWhitelisted)
            } else {
                Decision::Allow
            }
        }
        Classification::Unclassified => {
            let hit = |list: &[String]| list.iter().any(|entry| url.contains(entry.as_str()));
            if !snapshot.allow_proxy_all {
                Decision::Deny(DenyReason::ProxyAllDisabled)
            } else if !snapshot.other_black_list.is_empty() && hit(&snapshot.other_black_list) {
                Decision::Deny(DenyReason::OtherBlacklisted)
            } else if !snapshot.other_white_list.is_empty() && !hit(&snapshot.other_white_list) {
                Decision::Deny(DenyReason::OtherNotWhitelisted)
            } else {
                Decision::Allow
            }
        }
    }
}
