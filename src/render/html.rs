use std::fmt::Write;

use crate::catalog::Catalog;
use crate::pager::{self, ButtonKind};
use crate::product::{Product, DEFAULT_IMAGE};

use super::{Highlighter, Surface, ERROR_MESSAGE};

const NOT_FOUND: &str = r#"<div class="no-results">
  <div>&#128269;</div>
  <h3>Product not found</h3>
  <p>Try another search keyword</p>
</div>
"#;

const STYLE: &str = "\
body{font-family:sans-serif;margin:0;padding:1rem;background:#f5f5f5}
#productContainer{display:grid;grid-template-columns:repeat(auto-fill,minmax(220px,1fr));gap:1rem}
.card{background:#fff;border-radius:8px;overflow:hidden;box-shadow:0 1px 3px rgba(0,0,0,.15)}
.card img{width:100%;height:160px;object-fit:cover}
.card-content{padding:.75rem}
.badge{font-size:.75rem;padding:.1rem .4rem;border-radius:4px;background:#ddd}
.btn-shopee{color:#ee4d2d}.btn-tiktok{color:#03ac0e}
#pagination{margin-top:1rem;text-align:center}
#pagination button.active{font-weight:bold}
";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Highlight `text` for HTML output.
pub fn highlight(h: &Highlighter, text: &str) -> String {
    h.wrap(text, "<mark>", "</mark>", escape)
}

/// Render the current page into whichever slots the surface has.
/// Prior content is replaced, never appended to.
pub fn render(surface: &mut Surface, catalog: &Catalog) {
    let page = catalog.current_page();
    let (cards, strip) = if page.is_empty() {
        (NOT_FOUND.to_string(), String::new())
    } else {
        let h = Highlighter::new(catalog.query());
        let cards: String = page.iter().map(|p| card(&h, p)).collect();
        (cards, pagination(catalog.page(), catalog.filtered_len()))
    };

    if let Some(slot) = surface.cards.as_mut() {
        *slot = cards;
    }
    if let Some(slot) = surface.pagination.as_mut() {
        *slot = strip;
    }
}

fn card(h: &Highlighter, p: &Product) -> String {
    let platform = p.platform.as_str();
    format!(
        r#"<div class="card" data-platform="{platform}">
  <span class="badge badge-{platform}">{label}</span>
  <img src="{image}" loading="lazy" alt="{alt}" onerror="this.src='{fallback}'">
  <div class="card-content">
    <div class="card-title">{code}. {title}</div>
    <a href="{link}" target="_blank" rel="noopener noreferrer" class="btn-{platform}">View Product</a>
  </div>
</div>
"#,
        label = p.platform.label(),
        image = escape(&p.image),
        alt = escape(&p.title),
        fallback = DEFAULT_IMAGE,
        code = highlight(h, &p.code),
        title = highlight(h, &p.title),
        link = escape(&p.link),
    )
}

fn pagination(page: usize, len: usize) -> String {
    let mut out = String::new();
    for b in pager::buttons(page, len) {
        let (target, label) = match b.kind {
            ButtonKind::Prev => (page.saturating_sub(1), "Prev".to_string()),
            ButtonKind::Number(n) => (n, n.to_string()),
            ButtonKind::Next => (page.saturating_add(1), "Next".to_string()),
        };
        let class = if b.active { r#" class="active""# } else { "" };
        let disabled = if b.disabled { " disabled" } else { "" };
        let _ = write!(out, r#"<button data-page="{target}"{class}{disabled}>{label}</button>"#);
    }
    out
}

/// The whole page: search box, indicators and both containers.
/// Slots missing from the surface are left out of the markup.
pub fn document(surface: &Surface, query: &str) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    let _ = writeln!(out, "<title>Product Catalog</title>\n<style>\n{STYLE}</style>\n</head>\n<body>");
    let _ = writeln!(
        out,
        r#"<input id="searchInput" type="search" placeholder="Search code or name" value="{}">"#,
        escape(query)
    );

    let display = if surface.loading_visible() { "block" } else { "none" };
    let _ = writeln!(out, r#"<div id="loading" style="display:{display}">Loading...</div>"#);

    if let Some(e) = surface.error {
        let display = if e.visible { "block" } else { "none" };
        let _ = writeln!(out, r#"<div id="error" style="display:{display}">{ERROR_MESSAGE}</div>"#);
    }
    if let Some(cards) = &surface.cards {
        let _ = writeln!(out, "<div id=\"productContainer\">\n{cards}</div>");
    }
    if let Some(strip) = &surface.pagination {
        let _ = writeln!(out, "<div id=\"pagination\">{strip}</div>");
    }
    out.push_str("</body>\n</html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Snapshot;
    use crate::catalog::Action;

    fn catalog(n: usize) -> Catalog {
        let products = (1..=n)
            .map(|i| {
                Product::new(
                    &format!("P{}", i),
                    &format!("Shirt {}", i),
                    "https://shopee.co.id/x",
                    "",
                )
            })
            .collect();
        Catalog::new(Snapshot {
            products,
            timestamp: 0,
        })
    }

    #[test]
    fn highlight_blue_shirt() {
        let h = Highlighter::new("shi");
        assert_eq!(highlight(&h, "Blue Shirt"), "Blue <mark>Shi</mark>rt");
        assert_eq!(highlight(&Highlighter::new(""), "Blue Shirt"), "Blue Shirt");
    }

    #[test]
    fn feed_text_is_escaped() {
        let h = Highlighter::new("b");
        assert_eq!(highlight(&h, "<b>&"), "&lt;<mark>b</mark>&gt;&amp;");
    }

    #[test]
    fn one_card_per_product_on_page() {
        let mut s = Surface::full();
        render(&mut s, &catalog(10));
        let cards = s.cards.as_deref().unwrap();
        assert_eq!(cards.matches(r#"<div class="card""#).count(), 8);
        assert!(cards.contains("btn-shopee"));
        assert!(cards.contains(&format!("onerror=\"this.src='{}'\"", DEFAULT_IMAGE)));
        assert!(cards.contains(r#"target="_blank" rel="noopener noreferrer""#));
    }

    #[test]
    fn query_is_highlighted_in_title() {
        let mut c = catalog(3);
        c.dispatch(Action::Search("shirt 2".into()));
        let mut s = Surface::full();
        render(&mut s, &c);
        assert!(s.cards.unwrap().contains("P2. <mark>Shirt 2</mark>"));
    }

    #[test]
    fn empty_view_renders_not_found() {
        let mut c = catalog(3);
        c.dispatch(Action::Search("nothing".into()));
        let mut s = Surface::full();
        render(&mut s, &c);
        assert!(s.cards.as_deref().unwrap().contains("Product not found"));
        assert_eq!(s.pagination.as_deref(), Some(""));
    }

    #[test]
    fn pagination_strip_state() {
        let mut c = catalog(17);
        let mut s = Surface::full();
        render(&mut s, &c);
        let strip = s.pagination.clone().unwrap();
        assert!(strip.starts_with(r#"<button data-page="0" disabled>Prev</button>"#));
        assert!(strip.contains(r#"<button data-page="1" class="active" disabled>1</button>"#));
        assert!(strip.contains(r#"<button data-page="3">3</button>"#));
        assert!(strip.ends_with(r#"<button data-page="2">Next</button>"#));

        c.dispatch(Action::Goto(3));
        render(&mut s, &c);
        let strip = s.pagination.unwrap();
        assert!(strip.ends_with(r#"<button data-page="4" disabled>Next</button>"#));
    }

    #[test]
    fn render_is_idempotent() {
        let c = catalog(12);
        let mut s = Surface::full();
        render(&mut s, &c);
        let first = document(&s, c.query());
        render(&mut s, &c);
        assert_eq!(document(&s, c.query()), first);
    }

    #[test]
    fn missing_slots_are_skipped() {
        let mut s = Surface {
            pagination: Some(String::new()),
            ..Default::default()
        };
        render(&mut s, &catalog(3));
        assert!(s.cards.is_none());
        let doc = document(&s, "");
        assert!(!doc.contains("<div id=\"productContainer\">"));
        assert!(!doc.contains("id=\"error\""));
        assert!(doc.contains("<div id=\"pagination\">"));
    }

    #[test]
    fn document_shows_error_and_hides_loading() {
        let mut s = Surface::full();
        s.show_error();
        let doc = document(&s, "a\"b");
        assert!(doc.contains(r#"<div id="error" style="display:block">"#));
        assert!(doc.contains(r#"<div id="loading" style="display:none">"#));
        assert!(doc.contains(r#"value="a&quot;b""#));
    }
}
