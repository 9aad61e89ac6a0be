//! Line-oriented extraction of delimited blocks from plan output

/// Start and end line prefixes delimiting one kind of block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockMarkers {
    pub start: &'static str,
    pub end: &'static str,
}

/// Extract every block delimited by `markers`, in document order.
///
/// Marker lines are matched by prefix and are not part of the block text.
/// A block whose end marker never appears runs to the end of the input.
pub fn extract_blocks(lines: &[&str], markers: BlockMarkers) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut cursor = 0;

    while cursor < lines.len() {
        if !lines[cursor].starts_with(markers.start) {
            cursor += 1;
            continue;
        }

        let body_start = cursor + 1;
        let body_end = lines[body_start..]
            .iter()
            .position(|line| line.starts_with(markers.end))
            .map(|offset| body_start + offset)
            .unwrap_or(lines.len());

        blocks.push(join_trimmed(&lines[body_start..body_end]));

        // Resume after the end marker
        cursor = body_end + 1;
    }

    blocks
}

/// Lines mentioning an error, in document order
pub fn error_lines<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    lines
        .iter()
        .filter(|line| line.to_lowercase().contains("error"))
        .copied()
        .collect()
}

/// Join lines with newlines, dropping a single trailing blank line
pub fn join_trimmed(lines: &[&str]) -> String {
    let lines = match lines.split_last() {
        Some((last, rest)) if last.is_empty() => rest,
        _ => lines,
    };

    lines.join("\n")
}
