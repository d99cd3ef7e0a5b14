/// Inline text runs with emphasis styling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Bold(String),
    Italic(String),
    BoldItalic(String),
}

impl Span {
    /// The run's text with emphasis markers stripped.
    pub fn text(&self) -> &str {
        match self {
            Span::Text(text) | Span::Bold(text) | Span::Italic(text) | Span::BoldItalic(text) => {
                text
            }
        }
    }

    pub fn bold(&self) -> bool {
        matches!(self, Span::Bold(_) | Span::BoldItalic(_))
    }

    pub fn italic(&self) -> bool {
        matches!(self, Span::Italic(_) | Span::BoldItalic(_))
    }
}

/// Block-level elements parsed from Markdown
///
/// Blocks appear in source order and are never merged or reordered once
/// appended. Blank source lines produce no block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading {
        level: u8,
        content: Vec<Span>,
    },
    Paragraph {
        content: Vec<Span>,
    },
    ListItem {
        content: Vec<Span>,
    },
    /// Table cells stay plain strings; emphasis is not parsed inside cells.
    /// Row widths are not reconciled against the header here.
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    PageBreak,
}
