use std::borrow::Cow;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static PRE: Lazy<Selector> = Lazy::new(|| Selector::parse("pre").expect("invalid selector"));
static BODY: Lazy<Selector> = Lazy::new(|| Selector::parse("body").expect("invalid selector"));

/// Whatever the fetch layer returned for a single search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchedContent {
    /// Raw response body, e.g. an API payload
    Text(String),
    /// Rendered HTML document
    Document(String),
}

impl FetchedContent {
    pub fn as_str(&self) -> &str {
        match self {
            FetchedContent::Text(text) => text,
            FetchedContent::Document(html) => html,
        }
    }

    pub fn document(&self) -> Html {
        Html::parse_document(self.as_str())
    }

    /// Text holding a JSON payload.
    ///
    /// A browser shows a JSON response wrapped in a `<pre>`, so documents yield the
    /// first `<pre>` text, falling back to the body text.
    pub fn json_text(&self) -> Cow<'_, str> {
        match self {
            FetchedContent::Text(text) => Cow::Borrowed(text),
            FetchedContent::Document(html) => {
                let document = Html::parse_document(html);
                let text = document
                    .select(&PRE)
                    .next()
                    .or_else(|| document.select(&BODY).next())
                    .map(|el| el.text().collect::<String>())
                    .unwrap_or_default();
                Cow::Owned(text)
            }
        }
    }
}
