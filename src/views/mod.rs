//! Server-rendered storefront pages.

pub mod frame;
pub mod pages;

pub use frame::FrameEmbed;
pub use pages::{render_detail, render_error, render_home, render_index};

const STYLES: &str = r#"
body { margin: 0; background: #13111C; color: #E2E8F0; font-family: "Space Grotesk", system-ui, sans-serif; }
main { max-width: 72rem; margin: 0 auto; padding: 2rem; }
h1, h2, h3 { color: #A855F7; }
a { color: inherit; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(18rem, 1fr)); gap: 1.5rem; }
.card { display: block; background: #1A1625; border: 1px solid #7C3AED; border-radius: 0.75rem; overflow: hidden; text-decoration: none; }
.card img.cover { width: 100%; aspect-ratio: 4 / 3; object-fit: cover; }
.card .body { padding: 1rem; display: flex; flex-direction: column; gap: 0.5rem; }
.row { display: flex; justify-content: space-between; align-items: center; gap: 0.5rem; }
.pfp { width: 1.5rem; height: 1.5rem; border-radius: 50%; }
.stat { background: #1A1625; border: 1px solid #7C3AED; border-radius: 0.75rem; padding: 1rem; }
.button { display: inline-block; background: #7C3AED; color: #fff; border: 0; border-radius: 0.75rem; padding: 0.9rem 1.5rem; font-weight: bold; cursor: pointer; text-decoration: none; }
.notice { background: #7F1D1D; border-radius: 0.75rem; padding: 0.75rem 1rem; }
.muted { opacity: 0.7; }
"#;

/// Escapes text for HTML element content and double-quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Wraps a page body. `head` is trusted markup, `title` is escaped.
fn layout(title: &str, head: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\" />\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n\
         <title>{title}</title>\n{head}\n<style>{STYLES}</style>\n</head>\n<body>\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn layout_escapes_title_only() {
        let html = layout("A <b> title", "<meta name=\"x\" />", "<p>body</p>");
        assert!(html.contains("<title>A &lt;b&gt; title</title>"));
        assert!(html.contains("<meta name=\"x\" />"));
        assert!(html.contains("<p>body</p>"));
    }
}
