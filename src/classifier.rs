use scraper::{Html, Node};

use crate::{
    config::WindowPolicy,
    domain::{Availability, Reason},
};

/// Phrases that mark a course as not open for registration when they show
/// up near its code. Matched against lowercased text.
pub const NEGATIVE_INDICATORS: [&str; 5] =
    ["full", "closed", "no seats", "waitlist", "enrollment closed"];

const HIDDEN_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Returns the human-visible text of an HTML document, text nodes joined in
/// document order with markup removed.
pub fn extract_visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::with_capacity(html.len() / 2);
    for node in document.root_element().descendants() {
        let Node::Text(chunk) = node.value() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element())
            .is_some_and(|element| HIDDEN_ELEMENTS.contains(&element.name()));
        if !hidden {
            text.push_str(chunk);
        }
    }
    text
}

#[derive(Debug, Clone)]
pub struct AvailabilityClassifier {
    course_code: String,
    window: WindowPolicy,
}

impl AvailabilityClassifier {
    pub fn new(course_code: &str, window: WindowPolicy) -> Self {
        Self {
            course_code: course_code.to_lowercase(),
            window,
        }
    }

    /// Classifies already-extracted page text. Only the first occurrence of
    /// the course code is inspected.
    pub fn classify(&self, page_text: &str) -> Availability {
        let haystack = page_text.to_lowercase();
        let Some(index) = haystack.find(&self.course_code) else {
            tracing::warn!(
                target: "classify",
                course = %self.course_code,
                "course code not found on page"
            );
            return Availability::Unavailable(Reason::CodeNotFound);
        };

        let context = window_around(&haystack, index, self.window);
        match NEGATIVE_INDICATORS
            .iter()
            .copied()
            .find(|phrase| context.contains(phrase))
        {
            Some(phrase) => {
                tracing::debug!(
                    target: "classify",
                    course = %self.course_code,
                    indicator = phrase,
                    "negative indicator near course code"
                );
                Availability::Unavailable(Reason::Indicator(phrase))
            }
            None => Availability::Available,
        }
    }

    pub fn classify_html(&self, html: &str) -> Availability {
        self.classify(&extract_visible_text(html))
    }
}

/// Slice of `text` spanning `window.before` characters before byte offset
/// `start` and `window.after` characters from `start` on, clamped to the
/// text bounds.
fn window_around(text: &str, start: usize, window: WindowPolicy) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(window.before.saturating_sub(1))
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    let from = if window.before == 0 { start } else { from };

    let to = text[start..]
        .char_indices()
        .nth(window.after)
        .map(|(idx, _)| start + idx)
        .unwrap_or(text.len());

    &text[from..to]
}
