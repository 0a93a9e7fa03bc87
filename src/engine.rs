use std::io;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use url::Url;

use crate::document::Document;

const USER_AGENT_VALUE: &str = concat!("docs2pdf/", env!("CARGO_PKG_VERSION"));

/// Turns URLs into documents and documents into PDF files.
pub trait RenderEngine {
    /// Loads `url`; relative links in the result resolve against `base_url`
    /// unless the page declares its own base.
    fn load(&self, url: &Url, base_url: &Url) -> anyhow::Result<Document>;

    fn write_pdf(&self, document: &Document, target: &Path) -> anyhow::Result<()>;
}

/// Blocking HTTP fetcher for HTML pages.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    client: reqwest::blocking::Client,
}

impl HttpLoader {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build http client")?;
        Ok(Self { client })
    }

    pub fn fetch(&self, url: &Url, base_url: &Url) -> anyhow::Result<Document> {
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8")
            .send()
            .with_context(|| format!("GET {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("GET {url}: status {status}");
        }

        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            let content_type = content_type.to_ascii_lowercase();
            if !(content_type.starts_with("text/html")
                || content_type.starts_with("application/xhtml+xml"))
            {
                anyhow::bail!("GET {url}: not an html page ({content_type})");
            }
        }

        let body = response
            .text()
            .with_context(|| format!("read body: {url}"))?;
        Document::parse(&body, base_url.clone()).with_context(|| format!("parse html: {url}"))
    }
}

/// Fetches pages over HTTP and renders them with the `weasyprint` CLI.
#[derive(Debug, Clone)]
pub struct WeasyPrintEngine {
    loader: HttpLoader,
    program: String,
}

impl WeasyPrintEngine {
    pub fn new(program: impl Into<String>) -> anyhow::Result<Self> {
        Ok(Self {
            loader: HttpLoader::new()?,
            program: program.into(),
        })
    }
}

impl RenderEngine for WeasyPrintEngine {
    fn load(&self, url: &Url, base_url: &Url) -> anyhow::Result<Document> {
        self.loader.fetch(url, base_url)
    }

    fn write_pdf(&self, document: &Document, target: &Path) -> anyhow::Result<()> {
        let input = tempfile::Builder::new()
            .prefix("docs2pdf-")
            .suffix(".html")
            .tempfile()
            .context("create weasyprint input temp file")?;
        std::fs::write(input.path(), document.to_html()?)
            .with_context(|| format!("write weasyprint input: {}", input.path().display()))?;

        tracing::debug!(
            program = %self.program,
            base_url = %document.base_url(),
            target = %target.display(),
            "weasyprint"
        );

        let output = match Command::new(&self.program)
            .arg("--base-url")
            .arg(document.base_url().as_str())
            .arg(input.path())
            .arg(target)
            .output()
        {
            Ok(output) => output,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                anyhow::bail!(
                    "weasyprint not found ({}); install weasyprint or pass `--weasyprint <PATH>`",
                    self.program
                );
            }
            Err(err) => {
                return Err(err).with_context(|| format!("run weasyprint: {}", self.program));
            }
        };

        if !output.status.success() {
            anyhow::bail!(
                "weasyprint failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(())
    }
}
