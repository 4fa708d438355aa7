use crate::sniff::{PropertySpec, Sniff, SniffContext, SniffFlow};
use crate::tokens::{Token, TokenKind};
use crate::violation::Severity;

/// Lines should stay under a soft limit and must stay under a hard one.
pub struct LineLength;

impl Sniff for LineLength {
    fn code(&self) -> &'static str {
        "Generic.Files.LineLength"
    }

    fn description(&self) -> &'static str {
        "Checks the length of each line, tabs expanded"
    }

    fn register(&self) -> &'static [TokenKind] {
        &TokenKind::ALL
    }

    fn properties(&self) -> Vec<PropertySpec> {
        vec![
            PropertySpec::int("line_limit", 80, "Warn above this many characters; 0 disables"),
            PropertySpec::int(
                "absolute_line_limit",
                100,
                "Error above this many characters; 0 disables",
            ),
            PropertySpec::bool(
                "ignore_comments",
                false,
                "Do not count a trailing comment toward the length",
            ),
        ]
    }

    fn process(&self, ctx: &mut SniffContext<'_>, _index: usize) -> SniffFlow {
        let limit = usize::try_from(ctx.properties().int("line_limit")).unwrap_or(0);
        let absolute = usize::try_from(ctx.properties().int("absolute_line_limit")).unwrap_or(0);
        let ignore_comments = ctx.properties().bool("ignore_comments");
        let tab_width = match ctx.tab_width() {
            0 => 4,
            width => width,
        };

        for line in measure(ctx.tokens().tokens(), tab_width) {
            let length = match line.trailing_comment {
                Some(start) if ignore_comments => {
                    if start == 0 {
                        continue;
                    }
                    start
                }
                _ => line.width,
            };
            if absolute > 0 && length > absolute {
                let message = format!(
                    "Line exceeds maximum limit of {absolute} characters; contains {length} characters"
                );
                ctx.add_on_line(line.anchor, line.number, Severity::Error, "MaxExceeded", message);
            } else if limit > 0 && length > limit {
                let message =
                    format!("Line exceeds {limit} characters; contains {length} characters");
                ctx.add_on_line(line.anchor, line.number, Severity::Warning, "TooLong", message);
            }
        }
        SniffFlow::SkipFile
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Line {
    number: usize,
    /// Token holding the first character of the line.
    anchor: usize,
    width: usize,
    /// Column where a comment ending the line starts.
    trailing_comment: Option<usize>,
}

fn measure(tokens: &[Token], tab_width: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut number = tokens.first().map_or(1, |t| t.line);
    let mut width = 0;
    let mut anchor = None;
    let mut last_content: Option<(TokenKind, usize)> = None;

    for (index, token) in tokens.iter().enumerate() {
        let mut start = width;
        for c in token.text.chars() {
            let line_anchor = *anchor.get_or_insert(index);
            match c {
                '\n' => {
                    lines.push(Line {
                        number,
                        anchor: line_anchor,
                        width,
                        trailing_comment: last_content
                            .filter(|(kind, _)| kind.is_comment())
                            .map(|(_, col)| col),
                    });
                    number += 1;
                    width = 0;
                    start = 0;
                    anchor = None;
                    last_content = None;
                }
                '\r' => {}
                '\t' => width += tab_width - width % tab_width,
                _ => {
                    if token.kind != TokenKind::Whitespace && !c.is_whitespace() {
                        last_content = Some((token.kind, start));
                    }
                    width += 1;
                }
            }
        }
    }
    if let Some(anchor) = anchor {
        lines.push(Line {
            number,
            anchor,
            width,
            trailing_comment: last_content
                .filter(|(kind, _)| kind.is_comment())
                .map(|(_, col)| col),
        });
    }
    lines
}
