// src/core/collaborators/html.rs

use scraper::{Html, Selector};

/// A parsed page, exposing just what the probes read from it.
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    pub fn parse(body: &str) -> Self {
        Self {
            document: Html::parse_document(body),
        }
    }

    /// Text of the first `<title>` element, trimmed. Empty titles count as
    /// missing.
    pub fn title(&self) -> Option<String> {
        let selector = Selector::parse("title").ok()?;
        let element = self.document.select(&selector).next()?;
        let text = element.text().collect::<String>().trim().to_string();
        (!text.is_empty()).then_some(text)
    }

    /// Every class token and id value on every element, in document order.
    pub fn class_and_id_tokens(&self) -> Vec<String> {
        let Ok(selector) = Selector::parse("*") else {
            return Vec::new();
        };
        let mut tokens = Vec::new();
        for element in self.document.select(&selector) {
            let element = element.value();
            tokens.extend(element.classes().map(str::to_string));
            if let Some(id) = element.id().filter(|id| !id.is_empty()) {
                tokens.push(id.to_string());
            }
        }
        tokens
    }

    /// `src` attribute of every `<script>` that has one.
    pub fn script_sources(&self) -> Vec<String> {
        let Ok(selector) = Selector::parse("script[src]") else {
            return Vec::new();
        };
        self.document
            .select(&selector)
            .filter_map(|el| el.value().attr("src"))
            .map(str::trim)
            .filter(|src| !src.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html>
  <head><title>  Example Domain </title></head>
  <body class="home wordpress" id="top">
    <div id="app" class="container"></div>
    <script src="/static/app.js"></script>
    <script>inline()</script>
    <script src="https://cdn.example.net/jquery.min.js"></script>
  </body>
</html>"#;

    #[test]
    fn test_title() {
        assert_eq!(HtmlPage::parse(PAGE).title().as_deref(), Some("Example Domain"));
        assert_eq!(HtmlPage::parse("<html><body>hi</body></html>").title(), None);
        assert_eq!(HtmlPage::parse("<title>   </title>").title(), None);
    }

    #[test]
    fn test_class_and_id_tokens() {
        let tokens = HtmlPage::parse(PAGE).class_and_id_tokens();
        for expected in ["home", "wordpress", "top", "app", "container"] {
            assert!(tokens.iter().any(|t| t == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_script_sources_skip_inline_scripts() {
        assert_eq!(
            HtmlPage::parse(PAGE).script_sources(),
            vec!["/static/app.js", "https://cdn.example.net/jquery.min.js"]
        );
    }
}
