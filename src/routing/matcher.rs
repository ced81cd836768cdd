//! URL shape matchers.
//!
//! # Responsibilities
//! - Recognize one GitHub URL shape each
//! - Capture owner and repo segments where the shape carries them
//!
//! # Design Decisions
//! - Input has already had its `http(s)://` prefix removed
//! - Segment matching is case-sensitive
//! - No regex to guarantee O(n) matching

/// Owner/repo segments captured from a URL. Empty when the shape lacks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Captures<'a> {
    pub owner: &'a str,
    pub repo: &'a str,
}

/// Trait for matching a scheme-less URL against one shape.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns the captured segments if the URL has this shape.
    fn capture<'a>(&self, url: &'a str) -> Option<Captures<'a>>;
}

/// `{host}{owner}/{repo}/{section}...` where the remainder after the repo
/// starts with one of `sections`.
#[derive(Debug, Clone)]
pub struct RepoPathMatcher {
    host: &'static str,
    sections: &'static [&'static str],
}

impl RepoPathMatcher {
    /// `host` includes its trailing slash, e.g. `"github.com/"`.
    pub fn new(host: &'static str, sections: &'static [&'static str]) -> Self {
        Self { host, sections }
    }
}

impl Matcher for RepoPathMatcher {
    fn capture<'a>(&self, url: &'a str) -> Option<Captures<'a>> {
        let rest = url.strip_prefix(self.host)?;
        let (owner, rest) = split_segment(rest)?;
        let (repo, rest) = split_segment(rest)?;
        self.sections
            .iter()
            .any(|section| rest.starts_with(section))
            .then_some(Captures { owner, repo })
    }
}

/// `{host}{owner}/{repo}/{ref}/{path}` on the raw content hosts.
#[derive(Debug, Clone)]
pub struct RawContentMatcher {
    hosts: &'static [&'static str],
}

impl RawContentMatcher {
    pub fn new(hosts: &'static [&'static str]) -> Self {
        Self { hosts }
    }
}

impl Matcher for RawContentMatcher {
    fn capture<'a>(&self, url: &'a str) -> Option<Captures<'a>> {
        let rest = self.hosts.iter().find_map(|host| url.strip_prefix(host))?;
        let (owner, rest) = split_segment(rest)?;
        let (repo, rest) = split_segment(rest)?;
        has_inner_slash(rest).then_some(Captures { owner, repo })
    }
}

/// `{host}{owner}/{id}/{file}`; only the owner is captured.
#[derive(Debug, Clone)]
pub struct GistMatcher {
    host: &'static str,
}

impl GistMatcher {
    pub fn new(host: &'static str) -> Self {
        Self { host }
    }
}

impl Matcher for GistMatcher {
    fn capture<'a>(&self, url: &'a str) -> Option<Captures<'a>> {
        let rest = url.strip_prefix(self.host)?;
        let (owner, rest) = split_segment(rest)?;
        has_inner_slash(rest).then_some(Captures { owner, repo: "" })
    }
}

/// Any URL starting with `prefix`; captures nothing.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    prefix: &'static str,
}

impl PrefixMatcher {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }
}

impl Matcher for PrefixMatcher {
    fn capture<'a>(&self, url: &'a str) -> Option<Captures<'a>> {
        url.starts_with(self.prefix).then(Captures::default)
    }
}

/// Split off a non-empty leading segment terminated by `/`.
fn split_segment(s: &str) -> Option<(&str, &str)> {
    let (segment, rest) = s.split_once('/')?;
    (!segment.is_empty()).then_some((segment, rest))
}

/// True if `s` has a `/` that is neither its first nor its last character.
fn has_inner_slash(s: &str) -> bool {
    s.bytes()
        .enumerate()
        .any(|(i, b)| b == b'/' && i > 0 && i + 1 < s.len())
}
