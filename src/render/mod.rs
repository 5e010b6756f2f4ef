pub mod html;
pub mod terminal;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

pub const ERROR_MESSAGE: &str = "Failed to load products. Reload to try again.";

/// Output targets for a render. A slot set to `None` is skipped.
#[derive(Default)]
pub struct Surface {
    pub cards: Option<String>,
    pub pagination: Option<String>,
    pub error: Option<ErrorIndicator>,
    loading_visible: bool,
    spinner: Option<ProgressBar>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ErrorIndicator {
    pub visible: bool,
}

impl Surface {
    /// Every slot present, nothing rendered yet.
    pub fn full() -> Self {
        Self {
            cards: Some(String::new()),
            pagination: Some(String::new()),
            error: Some(ErrorIndicator::default()),
            ..Default::default()
        }
    }

    pub fn show_loading(&mut self, message: &str) {
        self.loading_visible = true;
        let pb = ProgressBar::new_spinner();
        match ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed}]") {
            Ok(style) => pb.set_style(style),
            Err(e) => warn!("Spinner template rejected: {}", e),
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    pub fn hide_loading(&mut self) {
        self.loading_visible = false;
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    pub fn loading_visible(&self) -> bool {
        self.loading_visible
    }

    pub fn show_error(&mut self) {
        if let Some(indicator) = self.error.as_mut() {
            indicator.visible = true;
        }
    }

    pub fn error_visible(&self) -> bool {
        self.error.is_some_and(|e| e.visible)
    }
}

/// Piece of text split around query matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span<'a> {
    Plain(&'a str),
    Match(&'a str),
}

/// Finds every case-insensitive occurrence of the active query.
/// Text is compared lowercased, the same way the catalog filter compares it.
pub struct Highlighter {
    needle: Option<String>,
}

impl Highlighter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: (!query.is_empty()).then(|| query.to_lowercase()),
        }
    }

    pub fn spans<'a>(&self, text: &'a str) -> Vec<Span<'a>> {
        let Some(needle) = &self.needle else {
            return vec![Span::Plain(text)];
        };

        let mut spans = Vec::new();
        let mut last = 0;
        let mut pos = 0;
        while pos < text.len() {
            match match_end(needle, text, pos) {
                Some(end) => {
                    if pos > last {
                        spans.push(Span::Plain(&text[last..pos]));
                    }
                    spans.push(Span::Match(&text[pos..end]));
                    last = end;
                    pos = end;
                }
                None => pos += text[pos..].chars().next().map_or(1, char::len_utf8),
            }
        }
        if last < text.len() || spans.is_empty() {
            spans.push(Span::Plain(&text[last..]));
        }
        spans
    }

    /// Wrap matches in `open`/`close`, passing every piece of source text through `escape`.
    pub fn wrap(&self, text: &str, open: &str, close: &str, escape: fn(&str) -> String) -> String {
        self.spans(text)
            .into_iter()
            .map(|span| match span {
                Span::Plain(t) => escape(t),
                Span::Match(t) => format!("{}{}{}", open, escape(t), close),
            })
            .collect()
    }
}

/// End of a match of lowercased `needle` starting at byte `start`.
/// A char whose lowercase form runs past the needle is a miss.
fn match_end(needle: &str, text: &str, start: usize) -> Option<usize> {
    let mut folded = String::with_capacity(needle.len());
    for (i, c) in text[start..].char_indices() {
        folded.extend(c.to_lowercase());
        if !needle.starts_with(folded.as_str()) {
            return None;
        }
        if folded.len() == needle.len() {
            return Some(start + i + c.len_utf8());
        }
    }
    None
}
