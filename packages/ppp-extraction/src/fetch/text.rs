//! Markup-aware text extraction and page heuristics.

use regex::Regex;

/// Collapse runs of whitespace to single spaces and trim.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract visible text from markup: drop script/style/noscript content,
/// strip tags, decode the common entities, collapse whitespace.
pub(crate) fn visible_text(html: &str) -> String {
    let script = Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap();
    let style = Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap();
    let noscript = Regex::new(r"(?is)<noscript[^>]*>.*?</noscript>").unwrap();
    let comment = Regex::new(r"(?s)<!--.*?-->").unwrap();
    let tag = Regex::new(r"<[^>]+>").unwrap();

    let mut text = script.replace_all(html, " ").to_string();
    text = style.replace_all(&text, " ").to_string();
    text = noscript.replace_all(&text, " ").to_string();
    text = comment.replace_all(&text, " ").to_string();
    text = tag.replace_all(&text, " ").to_string();

    text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    collapse_whitespace(&text)
}

/// Look for an anti-automation challenge phrase in the page title or
/// body text. Returns the matched marker.
pub fn find_bot_marker(title: &str, body: &str, markers: &[String]) -> Option<String> {
    let title = title.to_lowercase();
    let body = body.to_lowercase();
    markers
        .iter()
        .find(|marker| {
            let needle = marker.to_lowercase();
            title.contains(&needle) || body.contains(&needle)
        })
        .cloned()
}

/// Shell markers left behind by client-side frameworks before hydration.
const SPA_HINTS: [&str; 6] = [
    "window.__NEXT_DATA__",
    "window.__NUXT__",
    "<div id=\"root\"></div>",
    "<div id=\"app\"></div>",
    "data-reactroot",
    "ng-app",
];

/// Heuristic: does a direct-fetch result look like an unrendered app
/// shell that needs a browser to produce real content?
pub(crate) fn looks_unrendered(html: &str, text: &str) -> bool {
    if SPA_HINTS.iter().any(|hint| html.contains(hint)) && text.len() < 500 {
        return true;
    }
    // Lots of markup, almost no visible text.
    text.len() < 200 && html.len() > 2000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_text_strips_markup() {
        let html = r#"<html><head>
            <title>Acme</title>
            <style>body { color: red; }</style>
            <script>var tracking = "ignore me";</script>
        </head><body>
            <h1>Acme &amp; Sons</h1>
            <p>First   Draw
            approved.</p>
            <!-- hidden -->
        </body></html>"#;

        let text = visible_text(html);
        assert!(text.contains("Acme & Sons"));
        assert!(text.contains("First Draw approved."));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("ignore me"));
        assert!(!text.contains("hidden"));
    }

    #[test]
    fn test_bot_marker_is_case_insensitive() {
        let markers = vec!["security check".to_string(), "cloudflare".to_string()];

        let hit = find_bot_marker("Security Check - Please Wait", "", &markers);
        assert_eq!(hit, Some("security check".to_string()));

        let hit = find_bot_marker("Welcome", "Checking with CLOUDFLARE before continuing", &markers);
        assert_eq!(hit, Some("cloudflare".to_string()));

        assert_eq!(find_bot_marker("Acme LLC", "loan data", &markers), None);
    }

    #[test]
    fn test_spa_shell_looks_unrendered() {
        let shell = r#"<html><body><div id="root"></div><script src="app.js"></script></body></html>"#;
        assert!(looks_unrendered(shell, ""));

        let page = "<html><body><p>Plenty of real text about a first draw PPP loan \
                    of $20,000 approved in April 2020 from Acme Bank, with more than \
                    enough detail to count as rendered content for extraction purposes.</p></body></html>";
        assert!(!looks_unrendered(page, &visible_text(page)));
    }
}
