use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::catalog::{Action, Catalog, Effect};
use crate::render::{html, terminal, Surface};

const HELP: &str = "/<text> search | n next | p prev | <number> go to page | q quit";

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Action(Action),
    Help,
    Quit,
}

/// One line of user input. Blank lines are ignored.
pub fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim_end_matches(['\r', '\n']);
    if let Some(query) = line.strip_prefix('/') {
        return Some(Input::Action(Action::Search(query.to_string())));
    }
    match line.trim() {
        "" => None,
        "n" | "next" => Some(Input::Action(Action::Next)),
        "p" | "prev" => Some(Input::Action(Action::Prev)),
        "q" | "quit" => Some(Input::Quit),
        cmd => match cmd.parse::<usize>() {
            Ok(n) => Some(Input::Action(Action::Goto(n))),
            Err(_) => Some(Input::Help),
        },
    }
}

/// Interactive loop: read an action, dispatch it, redraw when the state changed.
/// With `html_out`, the HTML page at that path is rewritten on every redraw.
pub async fn run<R, W>(
    catalog: &mut Catalog,
    surface: &mut Surface,
    input: R,
    output: &mut W,
    html_out: Option<&Path>,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(output, "{}", HELP)?;
    draw(catalog, surface, output, html_out, false)?;

    let mut lines = input.lines();
    loop {
        write!(output, "> ")?;
        output.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            None => {}
            Some(Input::Quit) => break,
            Some(Input::Help) => writeln!(output, "{}", HELP)?,
            Some(Input::Action(action)) => {
                debug!("Dispatching {:?}", action);
                match catalog.dispatch(action) {
                    Effect::None => {}
                    Effect::Render => draw(catalog, surface, output, html_out, false)?,
                    Effect::RenderAndScrollTop => draw(catalog, surface, output, html_out, true)?,
                }
            }
        }
    }
    Ok(())
}

fn draw<W: Write>(
    catalog: &Catalog,
    surface: &mut Surface,
    output: &mut W,
    html_out: Option<&Path>,
    scroll_top: bool,
) -> Result<()> {
    if scroll_top {
        write!(output, "{}", terminal::SCROLL_TOP)?;
    }
    write!(output, "{}", terminal::render(catalog))?;

    html::render(surface, catalog);
    if let Some(path) = html_out {
        write_page(path, surface, catalog.query())?;
    }
    Ok(())
}

pub fn write_page(path: &Path, surface: &Surface, query: &str) -> Result<()> {
    std::fs::write(path, html::document(surface, query))
        .with_context(|| format!("Failed to write {}", path.display()))
}
