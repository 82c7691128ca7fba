//! Turns raw submission text into receipt lines.
//!
//! [`format_lines`] does the trimming and fixed-width wrapping,
//! [`Template`] lays the full receipt out around it, and [`classify_line`]
//! tells the terminal renderer how to style each line.

pub const HEADER: &str = "收据";
pub const SEPARATOR: &str = "------------------------";
pub const FOOTER: &str = "谢谢惠顾";
pub const CLOSING_MARKER: &str = "* * * * *";

/// Split `raw` into display lines.
///
/// Blank lines are dropped and every remaining line longer than
/// `wrap_width` characters is cut into consecutive chunks of exactly
/// `wrap_width` characters (the last chunk may be shorter). Widths count
/// chars, so CJK text never gets split inside a code point.
pub fn format_lines(raw: &str, wrap_width: usize) -> Vec<String> {
    let width = wrap_width.max(1);
    let mut out = Vec::new();

    for line in raw.lines().filter(|line| !line.trim().is_empty()) {
        let chars: Vec<char> = line.chars().collect();
        for chunk in chars.chunks(width) {
            out.push(chunk.iter().collect());
        }
    }

    out
}

/// The fully assembled, immutable line sequence of one receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    lines: Vec<String>,
    has_enrichment: bool,
}

impl Template {
    /// Lay out a receipt:
    /// header, timestamp, separator, body, separator,
    /// [enrichment, separator], footer, closing marker.
    ///
    /// The enrichment block is only inserted when `enrichment` still has
    /// lines left after formatting.
    pub fn assemble(
        body: &str,
        enrichment: Option<&str>,
        timestamp: &str,
        wrap_width: usize,
    ) -> Self {
        let body_lines = format_lines(body, wrap_width);
        let extra_lines = enrichment
            .map(|text| format_lines(text, wrap_width))
            .unwrap_or_default();
        let has_enrichment = !extra_lines.is_empty();

        let mut lines = Vec::with_capacity(body_lines.len() + extra_lines.len() + 7);
        lines.push(HEADER.to_string());
        lines.push(timestamp.to_string());
        lines.push(SEPARATOR.to_string());
        lines.extend(body_lines);
        lines.push(SEPARATOR.to_string());
        if has_enrichment {
            lines.extend(extra_lines);
            lines.push(SEPARATOR.to_string());
        }
        lines.push(FOOTER.to_string());
        lines.push(CLOSING_MARKER.to_string());

        Self {
            lines,
            has_enrichment,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn has_enrichment(&self) -> bool {
        self.has_enrichment
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Semantic role of a receipt line, used only for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Title,
    Timestamp,
    Separator,
    Body,
    Footer,
    ClosingMarker,
}

/// Classify the line at `index` of a receipt with `total` lines.
///
/// Position decides the fixed slots so user text that happens to contain
/// `*` or dashes is still styled as body.
pub fn classify_line(index: usize, text: &str, total: usize) -> LineKind {
    match index {
        0 => LineKind::Title,
        1 => LineKind::Timestamp,
        _ if total >= 2 && index == total - 1 => LineKind::ClosingMarker,
        _ if total >= 2 && index == total - 2 => LineKind::Footer,
        _ if text == SEPARATOR => LineKind::Separator,
        _ => LineKind::Body,
    }
}
