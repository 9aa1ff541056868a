use std::path::Path;

use anyhow::{Context, Result};
use url::Url;

use crate::discovery::DiscoveredTarget;

// how many entries the static list has historically been walked for
pub const DEFAULT_STATIC_LIMIT: usize = 5;

/// Load a static target list: a JSON array of `{ "url", "pageName" }`.
pub fn load_static(path: &Path, limit: usize) -> Result<Vec<DiscoveredTarget>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading target list {}", path.display()))?;
    parse_static(&raw, limit).with_context(|| format!("parsing target list {}", path.display()))
}

pub fn parse_static(raw: &str, limit: usize) -> Result<Vec<DiscoveredTarget>> {
    let mut targets: Vec<DiscoveredTarget> = serde_json::from_str(raw)?;
    targets.truncate(limit);
    Ok(targets)
}

/// Absolute form of a target url. Relative urls are joined onto `base` when one is given.
pub fn resolve_url(base: Option<&Url>, raw: &str) -> Result<Url> {
    match Url::parse(raw) {
        Ok(u) => Ok(u),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.with_context(|| format!("relative url {} needs a base (set CRAWL_URL_HEAD)", raw))?;
            Ok(base.join(raw)?)
        }
        Err(e) => Err(e).with_context(|| format!("invalid url {}", raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_list_is_bounded() {
        let raw = r#"[
            {"url": "/corp1/outline.html", "pageName": "One"},
            {"url": "/corp2/outline.html", "pageName": "Two"},
            {"url": "/corp3/outline.html", "pageName": "Three"}
        ]"#;
        let got = parse_static(raw, 2).unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[1].page_name, "Two");
    }

    #[test]
    fn malformed_list_is_an_error() {
        assert!(parse_static(r#"{"url": "x"}"#, 5).is_err());
    }

    #[test]
    fn relative_urls_join_the_base() {
        let base = Url::parse("https://job.example.jp/26/pc/search/").unwrap();
        let got = resolve_url(Some(&base), "/26/pc/search/corp1/outline.html").unwrap();
        assert_eq!(got.as_str(), "https://job.example.jp/26/pc/search/corp1/outline.html");

        let abs = resolve_url(None, "https://other.example/corp/outline.html").unwrap();
        assert_eq!(abs.host_str(), Some("other.example"));

        assert!(resolve_url(None, "/corp1/outline.html").is_err());
    }
}
