use std::fs::OpenOptions;
use std::io::{BufWriter, Write as _};
use std::path::Path;

use anyhow::Context as _;
use url::Url;

use crate::cli::Cli;
use crate::config::CrawlConfig;
use crate::document::Document;
use crate::engine::{RenderEngine, WeasyPrintEngine};
use crate::formats::{PageRecord, PageRecordStatus};
use crate::render::{PageError, PageRenderer, RenderedPage};
use crate::state::{CrawlState, PageStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Convergence passes after the root page.
    pub passes: usize,
    /// Calls into the engine's loader, root page included.
    pub loads: usize,
    /// Target paths with a `pages` entry.
    pub attempted: usize,
    pub written: usize,
    /// PDFs kept because they already existed.
    pub skipped: usize,
    pub bad_links: usize,
    pub write_errors: usize,
}

impl CrawlSummary {
    fn record(&mut self, page: &RenderedPage) {
        if page.written {
            self.written += 1;
        } else {
            self.skipped += 1;
        }
    }
}

#[derive(Debug)]
pub struct CrawlOutcome {
    pub state: CrawlState,
    pub summary: CrawlSummary,
}

pub fn run(args: Cli) -> anyhow::Result<()> {
    let mut config = CrawlConfig::new(&args.site_name, &args.base_url)
        .context("build crawl config")?
        .with_overwrite(args.overwrite);
    if let Some(out_dir) = &args.out_dir {
        config = config.with_output_root(out_dir);
    }

    let engine = WeasyPrintEngine::new(&args.weasyprint).context("build render engine")?;
    let outcome = crawl_site(&engine, &config)?;

    let summary = &outcome.summary;
    tracing::info!(
        passes = summary.passes,
        attempted = summary.attempted,
        written = summary.written,
        skipped = summary.skipped,
        bad_links = summary.bad_links,
        write_errors = summary.write_errors,
        targets = outcome.state.distinct_targets(),
        out = %config.output_root().display(),
        "crawl finished"
    );

    if let Some(report) = &args.report {
        write_report(&outcome.state, &config, Path::new(report)).context("write crawl report")?;
    }

    Ok(())
}

/// Renders the root page, then drains discovered links until every target has
/// been attempted once.
///
/// Only the output directory and the root page are fatal; every other page
/// failure is reported and recorded in the returned state.
pub fn crawl_site(engine: &dyn RenderEngine, config: &CrawlConfig) -> anyhow::Result<CrawlOutcome> {
    std::fs::create_dir_all(config.output_root())
        .with_context(|| format!("create output dir: {}", config.output_root().display()))?;

    let base_url = &config.base_url;
    println!("url={base_url}");
    let mut document = engine
        .load(base_url, base_url)
        .with_context(|| format!("load root page: {base_url}"))?;

    let renderer = PageRenderer::new(engine, config);
    let mut state = CrawlState::new(config.root_path());
    let mut summary = CrawlSummary {
        loads: 1,
        ..CrawlSummary::default()
    };

    let root = config.root_path();
    match renderer.render(&mut state, &root, &mut document) {
        Ok(page) => summary.record(&page),
        Err(err) => {
            report(&err, &root);
            summary.write_errors += 1;
        }
    }

    while state.has_unattempted() {
        drain_pending(&renderer, &mut state, &mut summary);
    }

    summary.attempted = state.pages_len();
    Ok(CrawlOutcome { state, summary })
}

/// One breadth-first pass over the links known when the pass starts. Links
/// discovered during the pass wait for the next one.
pub fn drain_pending(
    renderer: &PageRenderer<'_>,
    state: &mut CrawlState,
    summary: &mut CrawlSummary,
) {
    summary.passes += 1;
    tracing::debug!(
        pass = summary.passes,
        pending = state.unattempted_targets().len(),
        links = state.links_len(),
        "drain pass"
    );
    let base_url = renderer.resolver().scope().base_url().clone();

    for (href, link) in state.links_snapshot() {
        if state.is_attempted(&link.target) {
            continue;
        }

        println!("url={href}");
        summary.loads += 1;
        let result = load(renderer.engine(), &href, &base_url)
            .and_then(|mut document| renderer.render(state, &link.target, &mut document));

        match result {
            Ok(page) => {
                tracing::debug!(path = %page.path.display(), written = page.written, "page done");
                summary.record(&page);
                println!("url={href} done");
            }
            Err(err) => {
                report(&err, &link.source);
                match err {
                    PageError::Load { .. } => {
                        state.mark_failed(&link.target);
                        summary.bad_links += 1;
                    }
                    PageError::Write { .. } => summary.write_errors += 1,
                }
            }
        }
    }

    println!("Generated {} pages", state.pages_len());
}

fn load(engine: &dyn RenderEngine, href: &str, base_url: &Url) -> Result<Document, PageError> {
    Url::parse(href)
        .with_context(|| format!("parse link: {href}"))
        .and_then(|url| engine.load(&url, base_url))
        .map_err(|source| PageError::Load {
            href: href.to_owned(),
            source,
        })
}

fn report(err: &PageError, parent: &Path) {
    crate::logging::dump_error(err.inner());
    match err {
        PageError::Load { href, source } => {
            eprintln!("Bad link: {href} on {};{source:#}", parent.display());
        }
        PageError::Write { source, .. } => eprintln!("Error: {source:#}"),
    }
}

/// Writes one JSON line per page: the root first, then links in discovery order.
pub fn write_report(state: &CrawlState, config: &CrawlConfig, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create report dir: {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(out)
        .with_context(|| format!("create report: {}", out.display()))?;
    let mut writer = BufWriter::new(file);

    let root = config.root_path();
    let records = std::iter::once(record(
        state,
        config.base_url.as_str(),
        &root,
        None,
    ))
    .chain(
        state
            .links()
            .map(|(href, link)| record(state, href, &link.target, Some(link.source.as_path()))),
    );

    for record in records {
        serde_json::to_writer(&mut writer, &record).context("write report record json")?;
        writer
            .write_all(b"\n")
            .context("write report record newline")?;
    }

    writer.flush().context("flush report")?;
    Ok(())
}

fn record(state: &CrawlState, href: &str, target: &Path, source: Option<&Path>) -> PageRecord {
    let status = match state.page_status(target) {
        Some(PageStatus::Rendered(_)) => PageRecordStatus::Rendered,
        Some(PageStatus::Failed) => PageRecordStatus::Failed,
        None => PageRecordStatus::Pending,
    };
    PageRecord {
        href: href.to_owned(),
        path: target.to_string_lossy().to_string(),
        source: source.map(|source| source.to_string_lossy().to_string()),
        status,
    }
}
