use scraper::{ElementRef, Html, Selector};

// all matches of `css` under the document root, in document order
pub fn select_all<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    let Ok(sel) = Selector::parse(css) else { return Vec::new() };
    doc.select(&sel).collect()
}

pub fn select_within<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    let Ok(sel) = Selector::parse(css) else { return Vec::new() };
    scope.select(&sel).collect()
}

/// Normalized text of the first element matching `css`, or an empty string.
pub fn first_text(doc: &Html, css: &str) -> String {
    select_all(doc, css).into_iter().next().map(element_text).unwrap_or_default()
}

/// Concatenated text of all matches (jQuery-style `.text()` over a selection).
pub fn joined_text(scope: ElementRef<'_>, css: &str) -> String {
    let raw: String = select_within(scope, css)
        .into_iter()
        .flat_map(|el| el.text())
        .collect();
    collapse_whitespace(&raw)
}

pub fn element_text(el: ElementRef<'_>) -> String {
    let raw = el.text().collect::<String>();
    collapse_whitespace(&raw)
}

pub fn has_class(el: ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// Collapse every whitespace run (newlines included) to a single space and trim.
pub fn collapse_whitespace(s: &str) -> String {
    let mut buf = String::with_capacity(s.len());
    let mut in_ws = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !in_ws {
                if !buf.is_empty() { buf.push(' '); }
                in_ws = true;
            }
        } else {
            buf.push(ch);
            in_ws = false;
        }
    }
    buf.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_mixed_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b\u{3000}c  "), "a b c");
        assert_eq!(collapse_whitespace(" \n "), "");
    }

    #[test]
    fn first_text_empty_when_missing() {
        let doc = Html::parse_document("<p>hi</p>");
        assert_eq!(first_text(&doc, "#nope"), "");
        assert_eq!(first_text(&doc, "p"), "hi");
    }

    #[test]
    fn invalid_selector_matches_nothing() {
        let doc = Html::parse_document("<p>hi</p>");
        assert!(select_all(&doc, "p[").is_empty());
    }
}
