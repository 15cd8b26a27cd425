//! Retrieval of source text by relative path.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use log::debug;

use crate::CompileError;
use crate::config::SourceLocation;

/// Blocking text source; the driver calls it from worker threads.
pub trait Fetch: Send + Sync {
    /// # Errors
    /// - `Fetch` when the file cannot be retrieved
    fn fetch(&self, path: &str) -> Result<String, CompileError>;
}

/// Reads files below a local directory.
#[derive(Debug, Clone)]
pub struct DirFetcher {
    root: PathBuf,
}

impl DirFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Fetch for DirFetcher {
    fn fetch(&self, path: &str) -> Result<String, CompileError> {
        let full = self.root.join(path);
        debug!("reading '{}'", full.display());
        fs::read_to_string(&full).map_err(|e| CompileError::Fetch {
            path: full.display().to_string(),
            message: e.to_string(),
        })
    }
}

/// Downloads files relative to a base URL. Non-success statuses are errors.
pub struct HttpFetcher {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            agent: ureq::Agent::new_with_defaults(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'))
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, path: &str) -> Result<String, CompileError> {
        let url = self.url(path);
        debug!("downloading '{url}'");
        let fail = |e: ureq::Error| CompileError::Fetch {
            path: url.clone(),
            message: e.to_string(),
        };
        let response = self.agent.get(&url).call().map_err(fail)?;
        response.into_body().read_to_string().map_err(fail)
    }
}

/// The fetcher for a resolved source location.
pub fn fetcher_for(location: &SourceLocation) -> Arc<dyn Fetch> {
    match location {
        SourceLocation::Directory(root) => Arc::new(DirFetcher::new(root.clone())),
        SourceLocation::Url(base) => Arc::new(HttpFetcher::new(base.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_fetcher_reads_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("PBS")).unwrap();
        fs::write(dir.path().join("PBS/types.txt"), "[NORMAL]\n").unwrap();
        let fetcher = DirFetcher::new(dir.path());
        assert_eq!(fetcher.fetch("PBS/types.txt").unwrap(), "[NORMAL]\n");
        assert!(matches!(
            fetcher.fetch("PBS/moves.txt"),
            Err(CompileError::Fetch { .. })
        ));
    }

    #[test]
    fn http_urls_join_without_double_slashes() {
        let fetcher = HttpFetcher::new("https://example.org/data/");
        assert_eq!(fetcher.url("/PBS/moves.txt"), "https://example.org/data/PBS/moves.txt");
    }
}
