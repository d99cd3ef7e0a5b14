use crate::block::Block;
use crate::inline::parse_inline;

/// Classification of a single trimmed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum LineKind {
    TableRow(Vec<String>),
    PageBreak,
    Heading { level: u8, text: String },
    Bullet(String),
    Blank,
    Text(String),
}

/// Classify one trimmed line.
///
/// Table detection runs before every prefix check: a pipe-delimited line must
/// never be split by the heading or bullet rules.
fn classify(line: &str) -> LineKind {
    if !line.is_empty() && line.starts_with('|') && line.ends_with('|') {
        let cells = line
            .trim_matches('|')
            .split('|')
            .map(|cell| cell.trim().to_string())
            .collect();
        return LineKind::TableRow(cells);
    }
    if line == "---" {
        return LineKind::PageBreak;
    }
    if let Some(text) = line.strip_prefix("### ") {
        return LineKind::Heading {
            level: 3,
            text: text.to_string(),
        };
    }
    if let Some(text) = line.strip_prefix("## ") {
        return LineKind::Heading {
            level: 2,
            text: text.to_string(),
        };
    }
    if let Some(text) = line.strip_prefix("# ") {
        return LineKind::Heading {
            level: 1,
            text: text.to_string(),
        };
    }
    if let Some(text) = line.strip_prefix("* ") {
        return LineKind::Bullet(text.to_string());
    }
    if line.is_empty() {
        return LineKind::Blank;
    }
    LineKind::Text(line.to_string())
}

/// Accumulation state for the scan: rows collected while inside a table run.
/// An empty accumulator means the scan is not in a table.
#[derive(Default)]
struct ParseState {
    table_rows: Vec<Vec<String>>,
}

/// Parse markdown text into a list of blocks.
///
/// One left-to-right scan over lines. Consecutive table rows accumulate and
/// are flushed as a single table by the first non-table line or by the end of
/// input; that non-table line is then handled as its own block in the same
/// pass. Parsing never fails; malformed input degrades to plain paragraphs.
pub fn parse(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut state = ParseState::default();

    for line in markdown.lines() {
        process_line(classify(line.trim()), &mut state, &mut blocks);
    }
    flush_table(&mut state, &mut blocks);

    blocks
}

fn process_line(kind: LineKind, state: &mut ParseState, blocks: &mut Vec<Block>) {
    match kind {
        LineKind::TableRow(cells) => state.table_rows.push(cells),
        LineKind::PageBreak => {
            flush_table(state, blocks);
            blocks.push(Block::PageBreak);
        }
        LineKind::Heading { level, text } => {
            flush_table(state, blocks);
            blocks.push(Block::Heading {
                level,
                content: parse_inline(&text),
            });
        }
        LineKind::Bullet(text) => {
            flush_table(state, blocks);
            blocks.push(Block::ListItem {
                content: parse_inline(&text),
            });
        }
        LineKind::Blank => flush_table(state, blocks),
        LineKind::Text(text) => {
            flush_table(state, blocks);
            blocks.push(Block::Paragraph {
                content: parse_inline(&text),
            });
        }
    }
}

/// Close a pending table run. Flushing an empty accumulator is a no-op.
fn flush_table(state: &mut ParseState, blocks: &mut Vec<Block>) {
    if let Some(table) = assemble_table(std::mem::take(&mut state.table_rows)) {
        blocks.push(table);
    }
}

/// Build one table from the raw rows of a run.
///
/// Row 0 is the header. Row 1 is discarded as the header/body separator iff
/// its first cell contains `---`; otherwise every remaining row is data.
/// Cell counts are forwarded as-is, ragged rows included.
fn assemble_table(mut rows: Vec<Vec<String>>) -> Option<Block> {
    if rows.is_empty() {
        return None;
    }
    let headers = rows.remove(0);
    let has_separator = rows
        .first()
        .and_then(|row| row.first())
        .map(|cell| cell.contains("---"))
        .unwrap_or(false);
    if has_separator {
        rows.remove(0);
    }
    Some(Block::Table { headers, rows })
}
