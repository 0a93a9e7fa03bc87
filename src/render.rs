use std::path::{Path, PathBuf};

use anyhow::Context as _;
use url::Url;

use crate::config::CrawlConfig;
use crate::document::Document;
use crate::engine::RenderEngine;
use crate::resolve::PathResolver;
use crate::state::CrawlState;

#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("bad link: {href}")]
    Load { href: String, source: anyhow::Error },
    #[error("render page: {}", .path.display())]
    Write { path: PathBuf, source: anyhow::Error },
}

impl PageError {
    pub fn inner(&self) -> &anyhow::Error {
        match self {
            Self::Load { source, .. } | Self::Write { source, .. } => source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub path: PathBuf,
    /// `false` when an existing PDF was kept.
    pub written: bool,
}

/// Rewrites a document's in-site anchors to local PDF references and writes
/// the document to its target path.
pub struct PageRenderer<'a> {
    engine: &'a dyn RenderEngine,
    config: &'a CrawlConfig,
    resolver: PathResolver,
}

impl<'a> PageRenderer<'a> {
    pub fn new(engine: &'a dyn RenderEngine, config: &'a CrawlConfig) -> Self {
        Self {
            engine,
            config,
            resolver: PathResolver::new(config),
        }
    }

    pub fn engine(&self) -> &'a dyn RenderEngine {
        self.engine
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// The target is marked attempted in `state` before the write, so a
    /// failed write is never retried.
    pub fn render(
        &self,
        state: &mut CrawlState,
        target: &Path,
        document: &mut Document,
    ) -> Result<RenderedPage, PageError> {
        self.rewrite_links(state, target, document);

        println!("path={}", target.display());
        let page = target
            .strip_prefix(self.config.output_root())
            .unwrap_or(target)
            .to_path_buf();
        state.mark_rendered(target, page);

        let written = self
            .write(target, document)
            .map_err(|source| PageError::Write {
                path: target.to_path_buf(),
                source,
            })?;

        Ok(RenderedPage {
            path: target.to_path_buf(),
            written,
        })
    }

    /// Returns the number of newly recorded links.
    pub fn rewrite_links(
        &self,
        state: &mut CrawlState,
        source: &Path,
        document: &mut Document,
    ) -> usize {
        let base = document.base_url().clone();
        let mut discovered = 0;

        for anchor in document.anchors() {
            let Ok(resolved) = base.join(anchor.href.trim()) else {
                continue;
            };
            if !self.resolver.scope().is_in_site(&resolved) {
                continue;
            }
            let href = resolved.to_string();
            let Some(target) = self.resolver.resolve(&href, state) else {
                continue;
            };

            document.set_href(anchor.index, local_file_href(&target));

            if state.record_link(&href, target, source.to_path_buf()) {
                println!("href={href}");
                tracing::debug!(href = %href, source = %source.display(), "discovered link");
                discovered += 1;
            }
        }

        discovered
    }

    fn write(&self, target: &Path, document: &Document) -> anyhow::Result<bool> {
        if let Some(parent) = target.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create page dir: {}", parent.display()))?;
        }

        if target.is_file() && !self.config.overwrite {
            tracing::debug!(target = %target.display(), "pdf already exists; skipping");
            return Ok(false);
        }

        self.engine
            .write_pdf(document, target)
            .with_context(|| format!("write pdf: {}", target.display()))?;
        Ok(true)
    }
}

/// `file://` reference to `path`, made absolute against the working directory.
pub fn local_file_href(path: &Path) -> String {
    std::path::absolute(path)
        .ok()
        .and_then(|absolute| Url::from_file_path(absolute).ok())
        .map(String::from)
        .unwrap_or_else(|| format!("file://{}", path.display()))
}
