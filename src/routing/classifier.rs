//! GitHub resource classification.
//!
//! # Responsibilities
//! - Hold the fixed, ordered table of URL shapes
//! - Map a normalized URL to the first matching shape's owner/repo
//!
//! # Design Decisions
//! - Table compiled once at startup, immutable at runtime
//! - First match wins; declaration order is part of the contract
//! - An optional `http://` or `https://` prefix is tolerated

use crate::routing::matcher::{
    GistMatcher, Matcher, PrefixMatcher, RawContentMatcher, RepoPathMatcher,
};

/// Which URL shape a GitHub resource was recognized by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    /// `github.com/{owner}/{repo}/releases/...` or `/archive/...`
    Release,
    /// `github.com/{owner}/{repo}/blob/...` or `/raw/...`
    Content,
    /// `github.com/{owner}/{repo}/info...` or `/git-...`
    GitProtocol,
    /// `raw.githubusercontent.com/{owner}/{repo}/{ref}/{path}`
    RawHost,
    /// `gist.github.com/{owner}/{id}/{file}`
    Gist,
    /// `api.github.com/...`
    ApiHost,
    /// `github.com/api/...`
    ApiPath,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Release => "release",
            ResourceKind::Content => "content",
            ResourceKind::GitProtocol => "git",
            ResourceKind::RawHost => "raw",
            ResourceKind::Gist => "gist",
            ResourceKind::ApiHost => "api",
            ResourceKind::ApiPath => "api-path",
        }
    }
}

/// An identified GitHub resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubResource {
    pub kind: ResourceKind,
    /// Empty for the API shapes.
    pub owner: String,
    /// Empty for gists and the API shapes.
    pub repo: String,
}

/// Result of classifying a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    GitHub(GitHubResource),
    Unclassified,
}

impl Classification {
    pub fn is_github(&self) -> bool {
        matches!(self, Classification::GitHub(_))
    }

    pub fn kind(&self) -> Option<ResourceKind> {
        match self {
            Classification::GitHub(resource) => Some(resource.kind),
            Classification::Unclassified => None,
        }
    }
}

/// Ordered shape table.
#[derive(Debug)]
pub struct Classifier {
    shapes: Vec<(ResourceKind, Box<dyn Matcher>)>,
}

impl Classifier {
    pub fn new() -> Self {
        let shapes: Vec<(ResourceKind, Box<dyn Matcher>)> = vec![
            (
                ResourceKind::Release,
                Box::new(RepoPathMatcher::new("github.com/", &["releases/", "archive/"])),
            ),
            (
                ResourceKind::Content,
                Box::new(RepoPathMatcher::new("github.com/", &["blob/", "raw/"])),
            ),
            (
                ResourceKind::GitProtocol,
                Box::new(RepoPathMatcher::new("github.com/", &["info", "git-"])),
            ),
            (
                ResourceKind::RawHost,
                Box::new(RawContentMatcher::new(&[
                    "raw.githubusercontent.com/",
                    "raw.github.com/",
                ])),
            ),
            (ResourceKind::Gist, Box::new(GistMatcher::new("gist.github.com/"))),
            (ResourceKind::ApiHost, Box::new(PrefixMatcher::new("api.github.com/"))),
            (ResourceKind::ApiPath, Box::new(PrefixMatcher::new("github.com/api/"))),
        ];
        Self { shapes }
    }

    /// Classify `url`. Pure function of the text.
    pub fn classify(&self, url: &str) -> Classification {
        let bare = strip_scheme(url);
        self.shapes
            .iter()
            .find_map(|(kind, matcher)| {
                matcher.capture(bare).map(|caps| GitHubResource {
                    kind: *kind,
                    owner: caps.owner.to_string(),
                    repo: caps.repo.to_string(),
                })
            })
            .map_or(Classification::Unclassified, Classification::GitHub)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_scheme(url: &str) -> &str {
    url.strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url)
}
