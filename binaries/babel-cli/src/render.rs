//! Terminal rendering of pages

use crossterm::style::Stylize;

use babel_core::{PageBuffer, SnippetMark};

/// The page cut into `width`-character lines. With `styled`, the snippet
/// range is painted black on yellow.
pub fn wrap_page(page: &PageBuffer, width: usize, highlight: Option<SnippetMark>, styled: bool) -> String {
    let text = page.as_str();
    let width = width.max(1);
    let mut out = String::with_capacity(text.len() + text.len() / width + 1);

    let mut start = 0;
    while start < text.len() {
        let end = (start + width).min(text.len());
        // ASCII only: byte offsets are character offsets
        let line = &text[start..end];

        match highlight.filter(|_| styled) {
            Some(mark) if mark.at < end && mark.at + mark.len > start => {
                let from = mark.at.max(start) - start;
                let to = (mark.at + mark.len).min(end) - start;
                out.push_str(&line[..from]);
                out.push_str(&line[from..to].black().on_yellow().to_string());
                out.push_str(&line[to..]);
            }
            _ => out.push_str(line),
        }

        out.push('\n');
        start = end;
    }

    out
}

/// First and last `keep` characters of a long address
pub fn abbreviate(address: &str, keep: usize) -> String {
    if address.len() <= keep * 2 + 3 {
        return address.to_string();
    }
    format!(
        "{}...{} ({} chars)",
        &address[..keep],
        &address[address.len() - keep..],
        address.len()
    )
}
