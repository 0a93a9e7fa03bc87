use clap::Parser;

use crate::config::{DEFAULT_BASE_URL, DEFAULT_SITE_NAME};

/// Renders every page of a documentation site to PDF, with in-site links
/// pointing at the generated files.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Site name; also the default output directory.
    #[arg(long, default_value = DEFAULT_SITE_NAME)]
    pub site_name: String,

    /// Root page of the site (must be http/https).
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Output directory for the PDF tree (default: the site name).
    #[arg(long)]
    pub out_dir: Option<String>,

    /// Re-render pages whose PDF already exists.
    #[arg(long)]
    pub overwrite: bool,

    /// WeasyPrint executable used to render PDFs.
    #[arg(long, default_value = "weasyprint")]
    pub weasyprint: String,

    /// Write a JSON Lines report of every page to this path.
    #[arg(long)]
    pub report: Option<String>,
}
