use std::fmt::Write;

use crate::catalog::Catalog;
use crate::pager::{self, ButtonKind};

use super::Highlighter;

/// Clear screen and move the cursor home.
pub const SCROLL_TOP: &str = "\x1b[2J\x1b[H";

fn verbatim(s: &str) -> String {
    s.to_string()
}

/// Current page as a plain-text table, matches marked with `[...]`.
pub fn render(catalog: &Catalog) -> String {
    let mut out = String::new();
    let page = catalog.current_page();

    if page.is_empty() {
        out.push_str("Product not found. Try another search keyword.\n");
        return out;
    }

    let h = Highlighter::new(catalog.query());
    let _ = writeln!(
        out,
        "{:>3} | {:<12} | {:<36} | {:<8} | {}",
        "#", "Code", "Title", "Platform", "Link"
    );
    let _ = writeln!(out, "{}", "-".repeat(100));

    let offset = (catalog.page() - 1) * pager::PAGE_SIZE;
    for (i, p) in page.iter().enumerate() {
        let code = h.wrap(&truncate(&p.code, 12), "[", "]", verbatim);
        let title = h.wrap(&truncate(&p.title, 36), "[", "]", verbatim);
        let _ = writeln!(
            out,
            "{:>3} | {:<12} | {:<36} | {:<8} | {}",
            offset + i + 1,
            code,
            title,
            p.platform.label(),
            p.link
        );
    }

    let _ = writeln!(out, "\n{}", strip(catalog.page(), catalog.filtered_len()));
    let _ = writeln!(
        out,
        "Page {}/{} | {} of {} products",
        catalog.page(),
        catalog.page_count(),
        catalog.filtered_len(),
        catalog.snapshot().products.len()
    );
    out
}

/// `< Prev  (1)  2  3  Next >`, with unavailable arrows blanked out.
fn strip(page: usize, len: usize) -> String {
    pager::buttons(page, len)
        .into_iter()
        .map(|b| match b.kind {
            ButtonKind::Prev if b.disabled => "      ".to_string(),
            ButtonKind::Prev => "< Prev".to_string(),
            ButtonKind::Next if b.disabled => String::new(),
            ButtonKind::Next => "Next >".to_string(),
            ButtonKind::Number(n) if b.active => format!("({})", n),
            ButtonKind::Number(n) => n.to_string(),
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}
