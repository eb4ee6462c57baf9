use regex::Regex;
use std::sync::OnceLock;

use crate::model::translation::Record;

pub const BODY_KEY: &str = "body";
pub const BLOCK_SEPARATOR: &str = "---";

const ESCAPE: char = '\\';

fn header_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<key>[A-Za-z][A-Za-z0-9_-]*):[ \t]?(?P<value>.*)$")
            .expect("header pattern is valid")
    })
}

/// Splits a component file into records.
///
/// A file is a list of blocks separated by `---` lines. A block opens with
/// `Key: Value` header lines; whatever follows the first blank (or
/// non-header) line is the block's body. A block whose first line is blank
/// has no headers at all. Keys are lowercased; blank blocks are dropped.
pub fn parse(text: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim_end() == BLOCK_SEPARATOR {
            records.extend(parse_block(&block));
            block.clear();
        } else {
            block.push(line);
        }
    }
    records.extend(parse_block(&block));

    records
}

fn parse_block(lines: &[&str]) -> Option<Record> {
    if lines.iter().all(|l| l.trim().is_empty()) {
        return None;
    }

    let mut record = Record::new();
    let mut body_start = lines.len();

    for (i, line) in lines.iter().enumerate() {
        match header_re().captures(line) {
            Some(caps) => {
                let key = caps["key"].to_ascii_lowercase();
                let value = caps["value"].trim_end().to_string();
                record.insert(key, value);
            }
            None => {
                body_start = i;
                break;
            }
        }
    }

    let body = lines[body_start..]
        .iter()
        .skip_while(|l| l.trim().is_empty())
        .map(|l| unescape_line(l))
        .collect::<Vec<_>>()
        .join("\n");
    let body = body.trim_end();

    if !body.is_empty() {
        record.insert(BODY_KEY.to_string(), body.to_string());
    }

    Some(record)
}

/// Whether `line` would read as a block separator once its leading escapes
/// are stripped: `---`, `\---`, `\\---` and so on.
fn is_escaped_separator(line: &str) -> bool {
    line.trim_end().trim_start_matches(ESCAPE) == BLOCK_SEPARATOR
}

/// Escapes a body line so it can never be read back as a block separator.
///
/// Every separator-like line gains one leading `\`, so a line that already
/// starts with escapes keeps them after [`parse`] strips one again.
pub fn escape_line(line: &str) -> String {
    if is_escaped_separator(line) {
        format!("{ESCAPE}{line}")
    } else {
        line.to_string()
    }
}

fn unescape_line(line: &str) -> &str {
    if line.starts_with(ESCAPE) && is_escaped_separator(line) {
        &line[ESCAPE.len_utf8()..]
    } else {
        line
    }
}
