//! Shared child/attribute stripping pass used by both the section and
//! content-filter strategies: drops non-content chrome (scripts, nav,
//! ads, hidden elements, comments, social blocks) from a chosen
//! element's descendants and strips presentation/scripting attributes
//! from what's left, re-serializing to an HTML string.
//!
//! `scraper`'s parsed tree has no in-place node removal, so this walks
//! the tree and rebuilds the HTML string, skipping pruned subtrees
//! instead of mutating anything.

use scraper::{ElementRef, Node};

/// Tag names that are never part of a recipe's content, regardless of
/// where they sit in the document.
pub const PRUNE_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "header", "footer", "svg", "iframe", "form", "aside",
    "button", "select", "textarea", "object", "embed", "video", "audio",
];

/// Substrings matched case-insensitively against an element's `class`
/// and `id` attributes to catch ads, social widgets, and similar chrome
/// that isn't identifiable by tag name alone.
const CHROME_CLASS_ID_PATTERNS: &[&str] = &[
    "ad-", "ads-", "advert", "sponsor", "social", "share", "sharing", "comment", "sidebar",
    "popup", "modal", "banner", "newsletter", "subscribe", "cookie-consent", "related-post",
    "promo",
];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Re-serializes `root` with unwanted descendants dropped and
/// `style`/`class`/`id`/`data-*`/`on*` attributes stripped from every
/// surviving element. `root` itself is always kept — callers have
/// already decided it's the container worth cleaning.
pub fn render_pruned(root: ElementRef) -> String {
    let mut out = String::new();
    let el = root.value();
    write_open_tag(el.name(), el.attrs(), &mut out);
    for child in root.children() {
        render_node(child, &mut out);
    }
    write_close_tag(el.name(), &mut out);
    out
}

fn render_node(node: ego_tree::NodeRef<Node>, out: &mut String) {
    match node.value() {
        Node::Element(el) => {
            if should_prune(el.name(), el.attrs()) {
                return;
            }
            write_open_tag(el.name(), el.attrs(), out);
            for child in node.children() {
                render_node(child, out);
            }
            write_close_tag(el.name(), out);
        }
        Node::Text(text) => out.push_str(&escape(text)),
        // Comments, doctypes, and nested document/fragment nodes carry
        // nothing a recipe extractor needs.
        _ => {}
    }
}

fn should_prune<'a>(name: &str, attrs: impl Iterator<Item = (&'a str, &'a str)>) -> bool {
    if PRUNE_TAGS.contains(&name) {
        return true;
    }

    let mut class_and_id = String::new();
    let mut hidden = false;
    for (attr_name, value) in attrs {
        match attr_name {
            "class" | "id" => {
                class_and_id.push_str(&value.to_ascii_lowercase());
                class_and_id.push(' ');
            }
            "hidden" => hidden = true,
            "aria-hidden" if value.eq_ignore_ascii_case("true") => hidden = true,
            "style" => {
                let lower = value.to_ascii_lowercase();
                if lower.contains("display:none")
                    || lower.contains("display: none")
                    || lower.contains("visibility:hidden")
                    || lower.contains("visibility: hidden")
                {
                    hidden = true;
                }
            }
            _ => {}
        }
    }

    hidden || CHROME_CLASS_ID_PATTERNS.iter().any(|pattern| class_and_id.contains(pattern))
}

fn is_kept_attr(name: &str) -> bool {
    !matches!(name, "style" | "class" | "id") && !name.starts_with("data-") && !name.starts_with("on")
}

fn write_open_tag<'a>(name: &str, attrs: impl Iterator<Item = (&'a str, &'a str)>, out: &mut String) {
    out.push('<');
    out.push_str(name);
    for (attr_name, value) in attrs {
        if is_kept_attr(attr_name) {
            out.push(' ');
            out.push_str(attr_name);
            out.push_str("=\"");
            out.push_str(&escape(value));
            out.push('"');
        }
    }
    out.push('>');
}

fn write_close_tag(name: &str, out: &mut String) {
    if !VOID_ELEMENTS.contains(&name) {
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
}

fn escape(value: &str) -> String {
    value.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}
