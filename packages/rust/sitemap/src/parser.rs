//! Event-based XML parsing for sitemap files.
//!
//! Handles standard `<urlset>` sitemaps and `<sitemapindex>` index files.
//! Anything else is a parse error, never a silent empty result.

use quick_xml::Reader;
use quick_xml::events::Event;

use stratbuilder_shared::{Result, StratBuilderError};

use crate::SitemapEntry;

/// Outcome of parsing one sitemap document.
#[derive(Debug, Clone, PartialEq)]
pub enum SitemapDocument {
    /// A regular sitemap: ordered URL entries.
    UrlSet(Vec<SitemapEntry>),
    /// A sitemap index: locations of child sitemaps.
    Index(Vec<String>),
}

/// Which container element we are currently inside.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Container {
    None,
    Url,
    Sitemap,
}

/// Parse a sitemap or sitemap-index document.
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut is_index: Option<bool> = None;
    let mut container = Container::None;
    let mut current_tag: Option<String> = None;

    let mut entries: Vec<SitemapEntry> = Vec::new();
    let mut child_locs: Vec<String> = Vec::new();
    let mut pending_loc: Option<String> = None;
    let mut pending_lastmod: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = local_name(e.name().as_ref());
                match name.as_str() {
                    "urlset" if is_index.is_none() => is_index = Some(false),
                    "sitemapindex" if is_index.is_none() => is_index = Some(true),
                    "url" => {
                        container = Container::Url;
                        pending_loc = None;
                        pending_lastmod = None;
                    }
                    "sitemap" => {
                        container = Container::Sitemap;
                        pending_loc = None;
                    }
                    _ => current_tag = Some(name),
                }
            }
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| StratBuilderError::sitemap_parse(format!("bad text node: {e}")))?
                    .trim()
                    .to_string();
                if text.is_empty() {
                    continue;
                }
                match (container, current_tag.as_deref()) {
                    (Container::Url | Container::Sitemap, Some("loc")) => {
                        pending_loc = Some(text);
                    }
                    (Container::Url, Some("lastmod")) => pending_lastmod = Some(text),
                    _ => {}
                }
            }
            Ok(Event::End(e)) => {
                let name = local_name(e.name().as_ref());
                match name.as_str() {
                    "url" => {
                        // Entries without a <loc> are skipped, not fatal
                        if let Some(url) = pending_loc.take() {
                            entries.push(SitemapEntry {
                                url,
                                lastmod: pending_lastmod.take(),
                            });
                        }
                        container = Container::None;
                    }
                    "sitemap" => {
                        if let Some(loc) = pending_loc.take() {
                            child_locs.push(loc);
                        }
                        container = Container::None;
                    }
                    _ => current_tag = None,
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(StratBuilderError::sitemap_parse(format!(
                    "malformed XML at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    match is_index {
        Some(true) => Ok(SitemapDocument::Index(child_locs)),
        Some(false) => Ok(SitemapDocument::UrlSet(entries)),
        None => Err(StratBuilderError::sitemap_parse(
            "document has no <urlset> or <sitemapindex> root",
        )),
    }
}

/// Strip an XML namespace prefix (`sm:loc` → `loc`).
fn local_name(raw: &[u8]) -> String {
    let s = String::from_utf8_lossy(raw);
    match s.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => s.into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URLSET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://example.com/blog/content-marketing</loc>
    <lastmod>2024-11-02</lastmod>
  </url>
  <url>
    <loc>https://example.com/blog/keyword-research</loc>
  </url>
</urlset>"#;

    const INDEX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://example.com/sitemap-posts.xml</loc></sitemap>
  <sitemap><loc>https://example.com/sitemap-pages.xml</loc></sitemap>
</sitemapindex>"#;

    #[test]
    fn parses_urlset_entries_in_order() {
        let doc = parse_sitemap(URLSET).expect("parse urlset");
        let SitemapDocument::UrlSet(entries) = doc else {
            panic!("expected urlset");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "https://example.com/blog/content-marketing");
        assert_eq!(entries[0].lastmod.as_deref(), Some("2024-11-02"));
        assert_eq!(entries[1].lastmod, None);
    }

    #[test]
    fn parses_sitemap_index() {
        let doc = parse_sitemap(INDEX).expect("parse index");
        let SitemapDocument::Index(locs) = doc else {
            panic!("expected index");
        };
        assert_eq!(locs.len(), 2);
        assert_eq!(locs[0], "https://example.com/sitemap-posts.xml");
    }

    #[test]
    fn handles_namespace_prefixes() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sm:url><sm:loc>https://example.com/a</sm:loc></sm:url>
</sm:urlset>"#;
        let doc = parse_sitemap(xml).expect("parse prefixed");
        assert_eq!(
            doc,
            SitemapDocument::UrlSet(vec![SitemapEntry {
                url: "https://example.com/a".into(),
                lastmod: None,
            }])
        );
    }

    #[test]
    fn url_without_loc_is_skipped() {
        let xml = r#"<urlset>
  <url><lastmod>2024-01-01</lastmod></url>
  <url><loc>https://example.com/kept</loc></url>
</urlset>"#;
        let SitemapDocument::UrlSet(entries) = parse_sitemap(xml).expect("parse") else {
            panic!("expected urlset");
        };
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://example.com/kept");
    }

    #[test]
    fn non_sitemap_document_is_a_parse_error() {
        let err = parse_sitemap("<html><body>not a sitemap</body></html>").unwrap_err();
        assert!(err.to_string().contains("sitemap parse error"));
    }

    #[test]
    fn mismatched_tags_are_a_parse_error() {
        let err = parse_sitemap("<urlset><url><loc>https://example.com/a</url></loc></urlset>")
            .unwrap_err();
        assert!(err.to_string().contains("sitemap parse error"));
    }
}
