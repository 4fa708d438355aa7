use crate::sniff::{PropertySpec, Sniff, SniffContext, SniffFlow};
use crate::tokens::TokenKind;

/// Every line must end with the configured end-of-line sequence.
pub struct LineEndings;

impl Sniff for LineEndings {
    fn code(&self) -> &'static str {
        "Generic.Files.LineEndings"
    }

    fn description(&self) -> &'static str {
        "Checks that end of line characters are correct"
    }

    fn register(&self) -> &'static [TokenKind] {
        &TokenKind::ALL
    }

    fn properties(&self) -> Vec<PropertySpec> {
        vec![PropertySpec::string(
            "eol_char",
            "\n",
            "Expected line ending; escaped forms such as \\r\\n are accepted",
        )]
    }

    fn process(&self, ctx: &mut SniffContext<'_>, _index: usize) -> SniffFlow {
        let tokens = ctx.tokens();
        let expected = unescape(ctx.properties().str("eol_char"));
        if !matches!(expected.as_str(), "\n" | "\r\n" | "\r") {
            return SniffFlow::SkipFile;
        }

        let mut found = None;
        let mut wrong = Vec::new();
        for (index, token) in tokens.tokens().iter().enumerate() {
            let endings = line_endings(&token.text);
            if endings.iter().any(|e| *e != expected) {
                wrong.push(index);
                if found.is_none() {
                    found = endings.into_iter().find(|e| *e != expected);
                }
            }
        }
        let Some(found) = found else {
            return SniffFlow::SkipFile;
        };

        let message = format!(
            "End of line character is invalid; expected \"{}\" but found \"{}\"",
            escape(&expected),
            escape(found)
        );
        ctx.add_fixable_error(0, "InvalidEOLChar", message, |cs| {
            for index in wrong {
                let text = tokens.text(index);
                cs.replace(index, text, normalize(text, &expected));
            }
        });
        SniffFlow::SkipFile
    }
}

/// Each line ending in `text`, in order.
fn line_endings(text: &str) -> Vec<&'static str> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                out.push("\r\n");
                i += 1;
            }
            b'\r' => out.push("\r"),
            b'\n' => out.push("\n"),
            _ => {}
        }
        i += 1;
    }
    out
}

fn normalize(text: &str, eol: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n").replace('\n', eol)
}

fn unescape(value: &str) -> String {
    value.replace("\\r", "\r").replace("\\n", "\n")
}

fn escape(value: &str) -> String {
    value.replace('\r', "\\r").replace('\n', "\\n")
}
