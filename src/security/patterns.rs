//! Compiled owner/repo list entries.

/// One side of an `owner/repo` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Any,
    Exact(String),
}

impl Segment {
    fn parse(s: &str) -> Self {
        if s == "*" {
            Segment::Any
        } else {
            Segment::Exact(s.to_string())
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Segment::Any => true,
            Segment::Exact(expected) => expected == value,
        }
    }
}

/// A GitHub white/black list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListPattern {
    /// `*`
    Any,
    /// `owner/repo`, either side may be `*`.
    Pair { owner: Segment, repo: Segment },
    /// Bare token, matched as a prefix of owner or repo.
    Prefix(String),
}

impl ListPattern {
    pub fn parse(entry: &str) -> Self {
        if entry == "*" {
            return ListPattern::Any;
        }
        match entry.split_once('/') {
            Some((owner, repo)) if !repo.contains('/') => ListPattern::Pair {
                owner: Segment::parse(owner),
                repo: Segment::parse(repo),
            },
            // Owner and repo never contain '/', so multi-slash entries
            // behave as prefixes that cannot match.
            _ => ListPattern::Prefix(entry.to_string()),
        }
    }

    pub fn matches(&self, owner: &str, repo: &str) -> bool {
        match self {
            ListPattern::Any => true,
            ListPattern::Pair {
                owner: owner_pat,
                repo: repo_pat,
            } => owner_pat.matches(owner) && repo_pat.matches(repo),
            ListPattern::Prefix(token) => {
                owner.starts_with(token.as_str()) || repo.starts_with(token.as_str())
            }
        }
    }
}
