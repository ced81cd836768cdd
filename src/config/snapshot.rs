//! Immutable policy snapshot.
//!
//! A [`ConfigSnapshot`] is compiled once from a [`ProxyConfig`] and never
//! mutated afterwards. Reloads build a fresh snapshot and swap it in whole.

use crate::config::schema::ProxyConfig;
use crate::security::patterns::ListPattern;

/// Point-in-time policy data read by the request pipeline.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub host: String,
    pub port: u16,
    pub size_limit: u64,
    pub github_white_list: Vec<ListPattern>,
    pub github_black_list: Vec<ListPattern>,
    pub allow_proxy_all: bool,
    pub other_white_list: Vec<String>,
    pub other_black_list: Vec<String>,
}

impl ConfigSnapshot {
    /// Compile list entries into patterns.
    pub fn compile(config: &ProxyConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            size_limit: config.size_limit_bytes(),
            github_white_list: compile_list(&config.white_list),
            github_black_list: compile_list(&config.black_list),
            allow_proxy_all: config.allow_proxy_all,
            other_white_list: config.other_white_list.clone(),
            other_black_list: config.other_black_list.clone(),
        }
    }
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self::compile(&ProxyConfig::default())
    }
}

fn compile_list(entries: &[String]) -> Vec<ListPattern> {
    entries.iter().map(|entry| ListPattern::parse(entry)).collect()
}
