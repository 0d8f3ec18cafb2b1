//! Card Description Markdown
//!
//! pulldown-cmark rendering for card descriptions and comments. Descriptions
//! come from other board members, so raw HTML is shown as text and only
//! http(s)/mailto links survive.

use pulldown_cmark::{html::push_html, CowStr, Event, Options, Parser, Tag};

/// Render markdown with the board's extensions enabled
pub fn parse_markdown(text: &str) -> String {
    let parser = Parser::new_ext(text, get_options()).map(sanitize_event);
    let mut html_output = String::new();
    push_html(&mut html_output, parser);
    html_output
}

/// Parse markdown for inline use (strips outer <p> tags)
pub fn parse_markdown_inline(text: &str) -> String {
    let html = parse_markdown(text);

    html.trim()
        .strip_prefix("<p>")
        .and_then(|s| s.strip_suffix("</p>"))
        .map(|s| s.to_string())
        .unwrap_or(html)
}

fn get_options() -> Options {
    Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS
}

fn sanitize_event(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_url(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    let lower = url.trim().to_ascii_lowercase();
    let allowed = ["http://", "https://", "mailto:", "#", "/"]
        .iter()
        .any(|scheme| lower.starts_with(scheme));
    if allowed {
        url
    } else {
        CowStr::Borrowed("#")
    }
}

/// Stable color class for a card label
pub fn label_class(label: &str) -> &'static str {
    const CLASSES: &[&str] = &[
        "label-red",
        "label-green",
        "label-blue",
        "label-yellow",
        "label-orange",
        "label-purple",
    ];
    let hash = label
        .bytes()
        .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
    CLASSES[hash % CLASSES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_html_is_escaped() {
        let html = parse_markdown("hello <script>alert(1)</script>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_task_list_and_strikethrough() {
        let html = parse_markdown("- [x] call the clinic\n- ~~fax~~");
        assert!(html.contains("checkbox"));
        assert!(html.contains("<del>fax</del>"));
    }

    #[test]
    fn test_javascript_links_are_neutralized() {
        let html = parse_markdown("[click](javascript:alert(1))");
        assert!(html.contains("href=\"#\""));
        assert!(!html.contains("javascript:"));

        let html = parse_markdown("[site](https://example.com)");
        assert!(html.contains("href=\"https://example.com\""));
    }

    #[test]
    fn test_inline_strips_paragraph() {
        assert_eq!(parse_markdown_inline("**Urgent** shift"), "<strong>Urgent</strong> shift");
    }

    #[test]
    fn test_label_class_is_stable() {
        assert_eq!(label_class("urgent"), label_class("urgent"));
        assert!(label_class("").starts_with("label-"));
    }
}
