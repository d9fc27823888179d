use scraper::{Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose text never reaches the index.
const HIDDEN: [&str; 5] = ["head", "script", "style", "noscript", "template"];

/// Drop the fragment; everything else `Url` already normalizes.
pub fn normalize(url: &Url) -> Url {
    let mut clean = url.clone();
    clean.set_fragment(None);
    clean
}

/// Absolute http(s) links of every `<a href>` in document order, resolved
/// against `base`, fragments removed, duplicates dropped.
pub fn extract_links(base: &Url, html: &str) -> Vec<Url> {
    let doc = Html::parse_document(html);
    let anchors = Selector::parse("a[href]").expect("valid selector");
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for a in doc.select(&anchors) {
        let Some(href) = a.value().attr("href") else { continue };
        let Ok(link) = base.join(href.trim()) else { continue };
        if !matches!(link.scheme(), "http" | "https") {
            continue;
        }
        let link = normalize(&link);
        if seen.insert(link.as_str().to_string()) {
            links.push(link);
        }
    }
    links
}

/// Visible text of a page: tags, comments, scripts and styles removed,
/// entities decoded.
pub fn strip_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut text = String::new();
    for node in doc.tree.root().descendants() {
        let Node::Text(chunk) = node.value() else { continue };
        let hidden = node.ancestors().any(|parent| match parent.value() {
            Node::Element(element) => HIDDEN.contains(&element.name()),
            _ => false,
        });
        if !hidden {
            text.push_str(chunk);
            text.push(' ');
        }
    }
    text
}
