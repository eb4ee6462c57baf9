use crate::model::translation::Record;
use crate::parsers::component::{escape_line, BLOCK_SEPARATOR, BODY_KEY};

/// Renders records back into the component file format.
///
/// Output is deterministic: header keys in sorted order, body last, blocks
/// joined by `---`. Header values are kept on one line; body lines that
/// would read as a separator are escaped.
pub fn render(records: &[Record]) -> String {
    let mut blocks: Vec<String> = Vec::with_capacity(records.len());

    for record in records {
        let mut out: Vec<String> = Vec::new();

        for (key, value) in record {
            if key == BODY_KEY {
                continue;
            }
            let one_line = value.replace(['\r', '\n'], " ");
            out.push(format!("{key}: {}", one_line.trim_end()));
        }

        if let Some(body) = record.get(BODY_KEY) {
            let body = body.trim_end();
            if !body.is_empty() {
                // Blank line closes the header section; a headerless block
                // still needs it so the body is never read as headers.
                out.push(String::new());
                out.extend(body.lines().map(escape_line));
            }
        }

        let mut block = out.join("\n");
        block.push('\n');
        blocks.push(block);
    }

    blocks.join(&format!("{BLOCK_SEPARATOR}\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::component;

    fn rec(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn render_sorts_headers_and_puts_body_last() {
        let out = render(&[rec(&[
            ("title", "Packing"),
            ("body", "Line one\n\nLine two"),
            ("difficulty", "advanced"),
        ])]);
        assert_eq!(
            out,
            "difficulty: advanced\ntitle: Packing\n\nLine one\n\nLine two\n"
        );
    }

    #[test]
    fn rendered_checks_parse_back() {
        let records = vec![
            rec(&[("text", "Lock the door"), ("label", "home")]),
            rec(&[("body", "Title: looks like a header")]),
        ];
        let text = render(&records);
        assert_eq!(component::parse(&text), records);
    }

    #[test]
    fn separator_lines_in_bodies_survive_a_reparse() {
        let records = vec![
            rec(&[("text", "Lock the door"), ("body", "Before\n---\nAfter")]),
            rec(&[("text", "Close windows"), ("body", "\\---\n--- \n----")]),
        ];
        let text = render(&records);
        assert_eq!(
            text,
            "text: Lock the door\n\nBefore\n\\---\nAfter\n---\ntext: Close windows\n\n\\\\---\n\\--- \n----\n"
        );
        assert_eq!(component::parse(&text), records);
    }
}
