use std::collections::HashMap;

use anyhow::Context as _;
use lol_html::{HtmlRewriter, RewriteStrSettings, Settings, element};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Position among the document's `<a>` elements.
    pub index: usize,
    pub href: String,
}

/// An HTML page whose anchor targets can be rewritten before it is handed to
/// the PDF renderer.
///
/// The page source is kept as fetched. Rewriting only touches the `href` of
/// overridden anchors; everything else passes through byte for byte.
#[derive(Debug)]
pub struct Document {
    source: String,
    base_url: Url,
    /// Raw `href` of every `<a>` element, in source order.
    links: Vec<Option<String>>,
    hrefs: HashMap<usize, String>,
}

impl Document {
    /// `base_url` applies unless the page declares its own `<base href>`.
    pub fn parse(source: &str, base_url: Url) -> anyhow::Result<Self> {
        let mut links = Vec::new();
        let mut declared = None;

        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![
                    element!("a", |el| {
                        links.push(el.get_attribute("href"));
                        Ok(())
                    }),
                    element!("base[href]", |el| {
                        if declared.is_none() {
                            declared = el.get_attribute("href");
                        }
                        Ok(())
                    }),
                ],
                strict: false,
                ..Settings::default()
            },
            |_: &[u8]| {},
        );
        rewriter.write(source.as_bytes()).context("scan html")?;
        rewriter.end().context("scan html")?;

        let base_url = declared
            .and_then(|href| base_url.join(href.trim()).ok())
            .unwrap_or(base_url);
        Ok(Self {
            source: source.to_owned(),
            base_url,
            links,
            hrefs: HashMap::new(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Anchors with a non-empty `href`, in document order.
    pub fn anchors(&self) -> Vec<Anchor> {
        self.links
            .iter()
            .enumerate()
            .filter_map(|(index, href)| {
                let href = match self.hrefs.get(&index) {
                    Some(href) => href.as_str(),
                    None => href.as_deref()?,
                };
                if href.trim().is_empty() {
                    return None;
                }
                Some(Anchor {
                    index,
                    href: href.to_owned(),
                })
            })
            .collect()
    }

    pub fn set_href(&mut self, index: usize, href: String) {
        self.hrefs.insert(index, href);
    }

    /// The page with rewritten anchors applied.
    pub fn to_html(&self) -> anyhow::Result<String> {
        if self.hrefs.is_empty() {
            return Ok(self.source.clone());
        }

        let hrefs = &self.hrefs;
        let mut index = 0_usize;
        lol_html::rewrite_str(
            &self.source,
            RewriteStrSettings {
                element_content_handlers: vec![element!("a", move |el| {
                    if let Some(href) = hrefs.get(&index) {
                        el.set_attribute("href", href)?;
                    }
                    index += 1;
                    Ok(())
                })],
                strict: false,
                ..RewriteStrSettings::default()
            },
        )
        .context("rewrite html links")
    }
}
