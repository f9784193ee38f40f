//! Content extraction - strips an HTML document down to its main text.
//!
//! Parsing is permissive (html5ever via `scraper`), so malformed markup
//! never fails; the worst case is falling back to the whole document.

use scraper::node::Element;
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

/// Element kinds whose whole subtree is chrome, not content.
const PRUNED_TAGS: &[&str] = &[
    "script", "style", "nav", "footer", "header", "noscript", "aside", "meta", "link",
];

/// Class tokens / ids that mark boilerplate blocks.
const NOISE_MARKERS: &[&str] = &[
    "nav",
    "footer",
    "header",
    "menu",
    "sidebar",
    "cookie-banner",
    "popup",
];

/// Main content landmarks, in priority order.
const MAIN_SELECTORS: &[&str] = &["main", "article", "[role='main']", "body"];

/// Extract the best-effort main textual content of an HTML document.
///
/// Output is newline separated, non-empty, trimmed phrases with no markup.
/// Returns an empty string when nothing textual remains.
pub fn extract_main_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let region = select_main_region(&document).unwrap_or_else(|| {
        debug!("No content landmark found, using whole document");
        document.root_element()
    });

    normalize_lines(&collect_text(region))
}

/// First landmark element that does not sit inside pruned chrome.
fn select_main_region(document: &Html) -> Option<ElementRef<'_>> {
    for selector_str in MAIN_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };

        if let Some(found) = document.select(&selector).find(|el| !is_inside_pruned(*el)) {
            debug!(landmark = %selector_str, "Selected main content region");
            return Some(found);
        }
    }
    None
}

fn is_pruned(element: &Element) -> bool {
    if PRUNED_TAGS.contains(&element.name()) {
        return true;
    }
    if element.id().is_some_and(|id| NOISE_MARKERS.contains(&id)) {
        return true;
    }
    element.classes().any(|class| NOISE_MARKERS.contains(&class))
}

fn is_inside_pruned(element: ElementRef<'_>) -> bool {
    is_pruned(element.value())
        || element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| is_pruned(ancestor.value()))
}

/// Concatenate text nodes under `root`, skipping pruned subtrees.
fn collect_text(root: ElementRef<'_>) -> String {
    let mut text = String::new();
    let mut stack = vec![*root];

    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(element) if is_pruned(element) => continue,
            _ => {}
        }
        // Reverse so children pop in document order
        stack.extend(node.children().rev());
    }

    text
}

/// Split into lines and double-space separated phrases; keep the non-empty ones.
pub fn normalize_lines(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_prefers_main_over_body() {
        let html = r#"<html><body>
            <p>Body text outside main</p>
            <main>
              <h1>Pricing</h1>
              <p>Pro plan costs $15 per month</p>
            </main>
        </body></html>"#;

        assert_eq!(
            extract_main_text(html),
            "Pricing\nPro plan costs $15 per month"
        );
    }

    #[test]
    fn test_article_then_role_main() {
        let article = "<body><p>x</p><article>Launch notes</article></body>";
        assert_eq!(extract_main_text(article), "Launch notes");

        let role = r#"<body><p>x</p><div role="main">Role content</div></body>"#;
        assert_eq!(extract_main_text(role), "Role content");
    }

    #[test]
    fn test_falls_back_to_body_without_chrome() {
        let html = r#"<html><head><title>Title</title><style>p { color: red }</style></head>
            <body>
              <header>Site header</header>
              <nav>Home | About</nav>
              <div class="cookie-banner big">Accept cookies</div>
              <div id="sidebar">Related links</div>
              <p>Real content here</p>
              <script>var tracking = 1;</script>
              <noscript>Enable JS</noscript>
              <aside>Aside text</aside>
              <footer>Copyright</footer>
            </body></html>"#;

        assert_eq!(extract_main_text(html), "Real content here");
    }

    #[test]
    fn test_main_inside_pruned_chrome_is_skipped() {
        let html = r#"<body>
            <header><main>Header main</main></header>
            <article>Article body</article>
        </body>"#;

        assert_eq!(extract_main_text(html), "Article body");
    }

    #[test]
    fn test_noise_markers_inside_main() {
        let html = r#"<main>
            <div class="popup">Subscribe now!</div>
            <p id="menu">Menu</p>
            <p class="content">Kept</p>
        </main>"#;

        assert_eq!(extract_main_text(html), "Kept");
    }

    #[test]
    fn test_splits_on_double_spaces() {
        let html = "<main><p>  Fast   Secure  Simple </p><p>one line</p></main>";
        assert_eq!(extract_main_text(html), "Fast\nSecure\nSimple one line");
    }

    #[test]
    fn test_malformed_html_does_not_fail() {
        let html = "<div><p>Unclosed paragraph\n<div>Nested <b>bold";
        assert_eq!(extract_main_text(html), "Unclosed paragraph\nNested bold");
    }

    #[test]
    fn test_empty_and_textless_documents() {
        assert_eq!(extract_main_text(""), "");
        assert_eq!(
            extract_main_text("<html><body><script>x()</script></body></html>"),
            ""
        );
    }

    #[test]
    fn test_normalize_lines() {
        assert_eq!(normalize_lines("  a  \n\n\t b   c \n"), "a\nb\nc");
    }

    fn html_fragment() -> impl Strategy<Value = String> {
        let word = prop::sample::select(vec![
            "pricing", "Plan", "$15", "new", "dark mode", "  ", "\n", "Contact us",
        ]);
        let tag = prop::sample::select(vec![
            "p", "div", "span", "main", "article", "nav", "script", "li", "footer", "b",
        ]);
        prop::collection::vec((tag, prop::collection::vec(word, 0..4)), 0..12).prop_map(
            |parts| {
                parts
                    .into_iter()
                    .map(|(tag, words)| format!("<{tag}>{}</{tag}>", words.join(" ")))
                    .collect::<String>()
            },
        )
    }

    proptest! {
        #[test]
        fn prop_output_has_no_markup_or_empty_lines(body in html_fragment()) {
            let html = format!("<html><body>{body}</body></html>");
            let text = extract_main_text(&html);

            prop_assert!(!text.contains('<'));
            prop_assert!(!text.contains('>'));
            if !text.is_empty() {
                prop_assert!(text.split('\n').all(|line| !line.is_empty()));
            }
        }
    }
}
