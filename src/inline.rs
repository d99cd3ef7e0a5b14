use once_cell::sync::Lazy;
use regex::Regex;

use crate::block::Span;

/// Emphasis delimiters, longest alternative first so `***` is never consumed
/// as `**` followed by a dangling `*`. Matches are non-greedy and never cross
/// a line boundary.
static EMPHASIS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*\*.*?\*\*\*|\*\*.*?\*\*|\*.*?\*").unwrap());

/// Tokenize one line into styled spans covering the whole line in order.
///
/// Text outside a delimiter pair is emitted unstyled. Unterminated markers
/// stay literal text, and spans that are empty after marker stripping are
/// dropped.
pub fn parse_inline(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut rest = 0;
    for matched in EMPHASIS.find_iter(line) {
        push_span(&mut spans, Span::Text(line[rest..matched.start()].to_string()));
        push_span(&mut spans, styled(matched.as_str()));
        rest = matched.end();
    }
    push_span(&mut spans, Span::Text(line[rest..].to_string()));
    spans
}

fn push_span(spans: &mut Vec<Span>, span: Span) {
    if !span.text().is_empty() {
        spans.push(span);
    }
}

/// Map one delimiter match to its span, markers stripped. Checked longest
/// first: `****` is a bold pair around an empty body, not bold+italic.
fn styled(matched: &str) -> Span {
    if matched.len() >= 6 && matched.starts_with("***") && matched.ends_with("***") {
        Span::BoldItalic(matched[3..matched.len() - 3].to_string())
    } else if matched.len() >= 4 && matched.starts_with("**") && matched.ends_with("**") {
        Span::Bold(matched[2..matched.len() - 2].to_string())
    } else {
        Span::Italic(matched[1..matched.len() - 1].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_line_is_one_span() {
        assert_eq!(
            parse_inline("hello world"),
            vec![Span::Text("hello world".to_string())]
        );
    }

    #[test]
    fn empty_line_yields_no_spans() {
        assert_eq!(parse_inline(""), vec![]);
    }

    #[test]
    fn each_marker_maps_to_its_style() {
        assert_eq!(parse_inline("**b**"), vec![Span::Bold("b".to_string())]);
        assert_eq!(parse_inline("*i*"), vec![Span::Italic("i".to_string())]);
        assert_eq!(
            parse_inline("***bi***"),
            vec![Span::BoldItalic("bi".to_string())]
        );
    }

    #[test]
    fn spans_cover_the_line_in_order() {
        assert_eq!(
            parse_inline("a **b** c *d* e"),
            vec![
                Span::Text("a ".to_string()),
                Span::Bold("b".to_string()),
                Span::Text(" c ".to_string()),
                Span::Italic("d".to_string()),
                Span::Text(" e".to_string()),
            ]
        );
    }

    #[test]
    fn unterminated_marker_stays_literal() {
        assert_eq!(
            parse_inline("*unclosed"),
            vec![Span::Text("*unclosed".to_string())]
        );
        assert_eq!(
            parse_inline("trailing star *"),
            vec![Span::Text("trailing star *".to_string())]
        );
    }

    #[test]
    fn marker_next_to_punctuation_without_close_is_plain() {
        assert_eq!(
            parse_inline("priced at *$100."),
            vec![Span::Text("priced at *$100.".to_string())]
        );
    }

    #[test]
    fn empty_emphasis_is_dropped() {
        assert_eq!(
            parse_inline("before ** after"),
            vec![
                Span::Text("before ".to_string()),
                Span::Text(" after".to_string()),
            ]
        );
    }

    #[test]
    fn four_stars_are_an_empty_bold_pair() {
        assert_eq!(
            parse_inline("x **** y"),
            vec![Span::Text("x ".to_string()), Span::Text(" y".to_string())]
        );
    }

    #[test]
    fn spans_concatenate_back_to_the_stripped_line() {
        let line = "start **bold** mid *it* ***both*** end";
        let joined: String = parse_inline(line)
            .iter()
            .map(|span| span.text().to_string())
            .collect();
        assert_eq!(joined, "start bold mid it both end");
    }
}
