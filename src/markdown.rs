use pulldown_cmark::{Event, Options, Parser, html};

/// Characters of content shown in a feed card before the ellipsis.
pub const PREVIEW_CHARS: usize = 200;

/// Render Markdown from an external system to HTML. Raw inline/block HTML
/// events are dropped before rendering, so script-capable markup never makes
/// it into a page.
pub fn render_sanitized(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).filter_map(|event| match event {
        Event::Html(_) | Event::InlineHtml(_) => None,
        other => Some(other),
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Escape a plain-text field for interpolation into HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// First `max_chars` characters of the content plus an ellipsis, always.
/// Counts chars, not bytes, so multi-byte text cannot split mid-character.
pub fn preview(content: &str, max_chars: usize) -> String {
    let mut out: String = content.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_renders_emphasis() {
        let html = render_sanitized("Hola **mundo**");
        assert!(html.contains("<strong>mundo</strong>"));
    }

    #[test]
    fn raw_html_is_dropped() {
        let html = render_sanitized("antes <script>alert(1)</script> después");
        assert!(!html.contains("<script>"));
        assert!(html.contains("antes"));
        assert!(html.contains("después"));
    }

    #[test]
    fn inline_html_is_dropped() {
        let html = render_sanitized("un <img src=x onerror=alert(1)> enlace");
        assert!(!html.contains("onerror"));
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn preview_truncates_on_char_boundaries() {
        let content = "ñ".repeat(300);
        let preview = preview(&content, PREVIEW_CHARS);
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 3);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn short_content_still_gets_ellipsis() {
        assert_eq!(preview("hola", PREVIEW_CHARS), "hola...");
    }
}
