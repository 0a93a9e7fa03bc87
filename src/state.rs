use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Site-relative href of the root page.
pub const ROOT_HREF: &str = "/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageStatus {
    /// Attempted; holds the page path relative to the output root.
    Rendered(PathBuf),
    /// The href behind this target could not be loaded. Never retried.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLink {
    pub target: PathBuf,
    /// Page that first referenced the link.
    pub source: PathBuf,
}

/// Mutable bookkeeping for a single crawl run.
///
/// All three tables are append-only: the href map and `links` keep their first
/// entry per key, and a target path enters `pages` exactly once.
#[derive(Debug, Clone)]
pub struct CrawlState {
    map: HashMap<String, PathBuf>,
    links: Vec<(String, PendingLink)>,
    seen_links: HashSet<String>,
    pages: HashMap<PathBuf, PageStatus>,
}

impl CrawlState {
    pub fn new(root_path: PathBuf) -> Self {
        let mut map = HashMap::new();
        map.insert(ROOT_HREF.to_owned(), root_path);
        Self {
            map,
            links: Vec::new(),
            seen_links: HashSet::new(),
            pages: HashMap::new(),
        }
    }

    pub fn target_for(&self, normalized_href: &str) -> Option<&Path> {
        self.map.get(normalized_href).map(PathBuf::as_path)
    }

    /// Records `target` for `normalized_href` unless a mapping already exists,
    /// and returns the mapping that is in effect.
    pub fn assign_target(&mut self, normalized_href: &str, target: PathBuf) -> &Path {
        self.map
            .entry(normalized_href.to_owned())
            .or_insert(target)
            .as_path()
    }

    pub fn map_len(&self) -> usize {
        self.map.len()
    }

    /// First source wins: returns `false` and leaves the table untouched when
    /// `href` was already recorded.
    pub fn record_link(&mut self, href: &str, target: PathBuf, source: PathBuf) -> bool {
        if !self.seen_links.insert(href.to_owned()) {
            return false;
        }
        self.links
            .push((href.to_owned(), PendingLink { target, source }));
        true
    }

    pub fn link(&self, href: &str) -> Option<&PendingLink> {
        self.links
            .iter()
            .find(|(candidate, _)| candidate == href)
            .map(|(_, link)| link)
    }

    /// Links in discovery order.
    pub fn links(&self) -> impl Iterator<Item = (&str, &PendingLink)> {
        self.links.iter().map(|(href, link)| (href.as_str(), link))
    }

    pub fn links_len(&self) -> usize {
        self.links.len()
    }

    pub fn links_snapshot(&self) -> Vec<(String, PendingLink)> {
        self.links.clone()
    }

    /// Distinct link targets without a `pages` entry, in discovery order.
    pub fn unattempted_targets(&self) -> Vec<&Path> {
        let mut seen = HashSet::new();
        self.links
            .iter()
            .map(|(_, link)| link.target.as_path())
            .filter(|target| !self.pages.contains_key(*target))
            .filter(|target| seen.insert(*target))
            .collect()
    }

    pub fn has_unattempted(&self) -> bool {
        self.links
            .iter()
            .any(|(_, link)| !self.pages.contains_key(&link.target))
    }

    pub fn distinct_targets(&self) -> usize {
        self.links
            .iter()
            .map(|(_, link)| link.target.as_path())
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn is_attempted(&self, target: &Path) -> bool {
        self.pages.contains_key(target)
    }

    /// Returns `false` if `target` was already attempted.
    pub fn mark_rendered(&mut self, target: &Path, page: PathBuf) -> bool {
        self.mark(target, PageStatus::Rendered(page))
    }

    /// Returns `false` if `target` was already attempted.
    pub fn mark_failed(&mut self, target: &Path) -> bool {
        self.mark(target, PageStatus::Failed)
    }

    fn mark(&mut self, target: &Path, status: PageStatus) -> bool {
        if self.pages.contains_key(target) {
            return false;
        }
        self.pages.insert(target.to_path_buf(), status);
        true
    }

    pub fn page_status(&self, target: &Path) -> Option<&PageStatus> {
        self.pages.get(target)
    }

    pub fn pages(&self) -> impl Iterator<Item = (&Path, &PageStatus)> {
        self.pages.iter().map(|(path, status)| (path.as_path(), status))
    }

    pub fn pages_len(&self) -> usize {
        self.pages.len()
    }

    pub fn failed_len(&self) -> usize {
        self.pages
            .values()
            .filter(|status| matches!(status, PageStatus::Failed))
            .count()
    }
}
