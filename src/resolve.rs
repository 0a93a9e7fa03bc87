use std::path::PathBuf;

use url::Url;

use crate::config::CrawlConfig;
use crate::state::{CrawlState, ROOT_HREF};

/// Decides which URLs belong to the crawled site and how they are keyed.
#[derive(Debug, Clone)]
pub struct SiteScope {
    base: Url,
    prefix: String,
}

impl SiteScope {
    pub fn new(base_url: &Url) -> Self {
        let prefix = base_url.as_str().trim_end_matches('/').to_owned();
        Self {
            base: base_url.clone(),
            prefix,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// A URL is in the site when it shares the base network location, or when
    /// its text contains the base URL.
    pub fn is_in_site(&self, url: &Url) -> bool {
        self.is_same_netloc(url) || url.as_str().contains(&self.prefix)
    }

    fn is_same_netloc(&self, url: &Url) -> bool {
        url.host_str().is_some()
            && url.host_str() == self.base.host_str()
            && url.port() == self.base.port()
            && url.username() == self.base.username()
    }

    /// Site-relative form of `href` with the fragment removed, or `None` when
    /// `href` points outside the site. Relative hrefs resolve against the base.
    pub fn site_relative(&self, href: &str) -> Option<String> {
        let url = match Url::parse(href) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => self.base.join(href).ok()?,
            Err(_) => return None,
        };
        if !self.is_in_site(&url) {
            return None;
        }

        let text = url.as_str();
        let relative = if let Some(rest) = text.strip_prefix(&self.prefix) {
            rest.to_owned()
        } else if self.is_same_netloc(&url) {
            match url.query() {
                Some(query) => format!("{}?{query}", url.path()),
                None => url.path().to_owned(),
            }
        } else {
            text.replacen(&self.prefix, "", 1)
        };

        Some(strip_fragment(&relative))
    }
}

fn strip_fragment(href: &str) -> String {
    let without = href.split('#').next().unwrap_or_default();
    if without.is_empty() {
        ROOT_HREF.to_owned()
    } else {
        without.to_owned()
    }
}

/// Maps site hrefs to the PDF paths that hold (or will hold) their pages.
#[derive(Debug, Clone)]
pub struct PathResolver {
    scope: SiteScope,
    site_root: PathBuf,
    root_path: PathBuf,
}

impl PathResolver {
    pub fn new(config: &CrawlConfig) -> Self {
        Self {
            scope: SiteScope::new(&config.base_url),
            site_root: config.output_root.clone(),
            root_path: config.root_path(),
        }
    }

    pub fn scope(&self) -> &SiteScope {
        &self.scope
    }

    /// Target path for `href`, recorded in the state's href map. `None` for
    /// hrefs outside the site.
    pub fn resolve(&self, href: &str, state: &mut CrawlState) -> Option<PathBuf> {
        let normalized = self.scope.site_relative(href)?;
        Some(self.resolve_normalized(&normalized, state))
    }

    /// An existing map entry always wins over a freshly derived path.
    pub fn resolve_normalized(&self, normalized: &str, state: &mut CrawlState) -> PathBuf {
        if let Some(existing) = state.target_for(normalized) {
            return existing.to_path_buf();
        }
        let target = self.target_path(normalized);
        state.assign_target(normalized, target).to_path_buf()
    }

    pub fn target_path(&self, normalized: &str) -> PathBuf {
        let stripped = normalized.trim_matches('/');
        if stripped.is_empty() {
            return self.root_path.clone();
        }
        self.site_root.join(format!("{stripped}.pdf"))
    }
}
