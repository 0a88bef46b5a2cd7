//! Configuration types for a document export.
//!
//! Everything the pipeline and the publisher need to know lives in
//! [`ExportConfig`], built via its [`ExportConfigBuilder`]. The CLI maps its
//! flags onto the builder; library callers set only the fields they care
//! about and keep the defaults for the rest.

use crate::error::ExportError;
use crate::progress::{ExportProgressCallback, ProgressCallback};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for a single Word → static-site export.
///
/// # Example
/// ```rust
/// use docx2site::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .docs_dir("site/docs")
///     .front_matter(true)
///     .build()
///     .unwrap();
/// assert!(config.front_matter);
/// ```
#[derive(Clone)]
pub struct ExportConfig {
    /// Root directory of the generated site. Default: `docs`.
    ///
    /// Each document gets its own `<docs_dir>/<document_stem>/` subtree which
    /// is removed and rebuilt on every export.
    pub docs_dir: PathBuf,

    /// Prepend Jekyll front matter (`layout: none`, `title`) to every
    /// generated HTML file. Default: false.
    ///
    /// Without it GitHub Pages serves the files verbatim; with it the pages
    /// pick up the document title as the Jekyll page title.
    pub front_matter: bool,

    /// Git working tree the publisher operates in. Default: `.`.
    pub repo_dir: PathBuf,

    /// Remote to push to. When `None`, a bare `git push` uses the upstream
    /// of the current branch.
    pub remote: Option<String>,

    /// Branch to push. Only used together with [`Self::remote`].
    pub branch: Option<String>,

    /// Custom commit message. Default: `Update images from <file name>`.
    pub commit_message: Option<String>,

    /// Public base URL of the Pages site, used to report where the
    /// published index lives.
    pub site_url: Option<String>,

    /// Optional progress callback for extraction and page events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            front_matter: false,
            repo_dir: PathBuf::from("."),
            remote: None,
            branch: None,
            commit_message: None,
            site_url: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExportConfig")
            .field("docs_dir", &self.docs_dir)
            .field("front_matter", &self.front_matter)
            .field("repo_dir", &self.repo_dir)
            .field("remote", &self.remote)
            .field("branch", &self.branch)
            .field("commit_message", &self.commit_message)
            .field("site_url", &self.site_url)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExportProgressCallback>"),
            )
            .finish()
    }
}

impl ExportConfig {
    /// Create a new builder for `ExportConfig`.
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }

    /// Output root for a document: `<docs_dir>/<document_stem>`.
    pub fn output_root(&self, document_stem: &str) -> PathBuf {
        self.docs_dir.join(document_stem)
    }

    /// Commit message for a document file name, honouring the override.
    pub fn commit_message_for(&self, file_name: &str) -> String {
        self.commit_message
            .clone()
            .unwrap_or_else(|| format!("Update images from {file_name}"))
    }

    /// Public URL of a document's index page, if a site URL is configured.
    ///
    /// `docs_dir` is expected to be relative to the repository root, which
    /// is how GitHub Pages maps it onto the site.
    pub fn index_url(&self, document_stem: &str) -> Option<String> {
        let base = self.site_url.as_deref()?.trim_end_matches('/');
        let docs = path_to_url(&self.docs_dir);
        Some(format!("{base}/{docs}/{document_stem}/index.html"))
    }
}

fn path_to_url(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn docs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.docs_dir = dir.into();
        self
    }

    pub fn front_matter(mut self, v: bool) -> Self {
        self.config.front_matter = v;
        self
    }

    pub fn repo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.repo_dir = dir.into();
        self
    }

    pub fn remote(mut self, remote: impl Into<String>) -> Self {
        self.config.remote = Some(remote.into());
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.config.branch = Some(branch.into());
        self
    }

    pub fn commit_message(mut self, message: impl Into<String>) -> Self {
        self.config.commit_message = Some(message.into());
        self
    }

    pub fn site_url(mut self, url: impl Into<String>) -> Self {
        self.config.site_url = Some(url.into());
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn ExportProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, ExportError> {
        let c = &self.config;
        if c.docs_dir.as_os_str().is_empty() {
            return Err(ExportError::InvalidConfig(
                "docs directory must not be empty".into(),
            ));
        }
        if c.branch.is_some() && c.remote.is_none() {
            return Err(ExportError::InvalidConfig(
                "a push branch requires a remote (e.g. --remote origin)".into(),
            ));
        }
        if let Some(ref msg) = c.commit_message {
            if msg.trim().is_empty() {
                return Err(ExportError::InvalidConfig(
                    "commit message must not be blank".into(),
                ));
            }
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ExportConfig::default();
        assert_eq!(c.docs_dir, PathBuf::from("docs"));
        assert!(!c.front_matter);
        assert!(c.remote.is_none());
    }

    #[test]
    fn output_root_joins_stem() {
        let c = ExportConfig::default();
        assert_eq!(c.output_root("report"), PathBuf::from("docs/report"));
    }

    #[test]
    fn commit_message_default_and_override() {
        let c = ExportConfig::default();
        assert_eq!(
            c.commit_message_for("report.docx"),
            "Update images from report.docx"
        );
        let c = ExportConfig::builder()
            .commit_message("Refresh figures")
            .build()
            .unwrap();
        assert_eq!(c.commit_message_for("report.docx"), "Refresh figures");
    }

    #[test]
    fn index_url_strips_trailing_slash() {
        let c = ExportConfig::builder()
            .site_url("https://example.github.io/site/")
            .build()
            .unwrap();
        assert_eq!(
            c.index_url("report").as_deref(),
            Some("https://example.github.io/site/docs/report/index.html")
        );
        assert!(ExportConfig::default().index_url("report").is_none());
    }

    #[test]
    fn branch_without_remote_is_rejected() {
        let err = ExportConfig::builder().branch("main").build().unwrap_err();
        assert!(matches!(err, ExportError::InvalidConfig(_)));
    }

    #[test]
    fn blank_commit_message_is_rejected() {
        assert!(ExportConfig::builder().commit_message("  ").build().is_err());
    }

    #[test]
    fn empty_docs_dir_is_rejected() {
        assert!(ExportConfig::builder().docs_dir("").build().is_err());
    }
}
