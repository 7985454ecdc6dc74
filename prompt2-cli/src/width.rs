//! Terminal width detection.

use tracing::debug;

/// Width assumed when nothing else is known.
pub const FALLBACK_WIDTH: usize = 80;

/// Columns available for the prompt.
///
/// An explicit `--width` wins, then the terminal itself, then `$COLUMNS`.
pub fn terminal_width(explicit: Option<usize>) -> usize {
    if let Some(width) = explicit.filter(|&w| w > 0) {
        return width;
    }

    match crossterm::terminal::size() {
        Ok((cols, _)) if cols > 0 => return usize::from(cols),
        Ok(_) => debug!("terminal reported zero columns"),
        Err(err) => debug!("could not query terminal size: {}", err),
    }

    columns_from(std::env::var("COLUMNS").ok().as_deref()).unwrap_or(FALLBACK_WIDTH)
}

fn columns_from(value: Option<&str>) -> Option<usize> {
    value?.trim().parse().ok().filter(|&w: &usize| w > 0)
}
