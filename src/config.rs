use std::path::{Path, PathBuf};

use anyhow::Context as _;
use url::Url;

pub const DEFAULT_SITE_NAME: &str = "infrastructure-docs";
pub const DEFAULT_BASE_URL: &str = "http://localhost:1313";
pub const ROOT_PAGE_FILE: &str = "index.pdf";

/// Settings for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub site_name: String,
    pub base_url: Url,
    /// Directory that receives the PDF tree. Defaults to `site_name`.
    pub output_root: PathBuf,
    /// Re-render pages whose PDF already exists.
    pub overwrite: bool,
}

impl CrawlConfig {
    pub fn new(site_name: &str, base_url: &str) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).with_context(|| format!("parse base url: {base_url}"))?;
        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            anyhow::bail!("base url must be http/https: {base_url}");
        }
        if site_name.trim().is_empty() {
            anyhow::bail!("site name must not be empty");
        }

        Ok(Self {
            site_name: site_name.to_owned(),
            base_url,
            output_root: PathBuf::from(site_name),
            overwrite: false,
        })
    }

    #[must_use]
    pub fn with_output_root(mut self, output_root: impl Into<PathBuf>) -> Self {
        self.output_root = output_root.into();
        self
    }

    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    /// Fixed output path of the site's root page.
    pub fn root_path(&self) -> PathBuf {
        self.output_root.join(ROOT_PAGE_FILE)
    }
}
