//! Ledger row format
//!
//! The ledger is a two-column delimited text file:
//!
//! ```text
//! link,image_done
//! https://www.instagram.com/someone/,true
//! https://www.instagram.com/someone_else/,
//! ```
//!
//! Fields may carry surrounding whitespace or quote characters; both are
//! ignored when comparing keys and flags. Extra columns are preserved.

/// Header written when the ledger is first created
pub const HEADER: [&str; 2] = ["link", "image_done"];

/// Value stored in the second column of a completed record
pub const DONE_VALUE: &str = "true";

/// Normalizes a url into the ledger's comparison key
pub fn normalize_key(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'')
}

/// Interprets a completion field
pub fn parse_done(field: &str) -> bool {
    normalize_key(field).eq_ignore_ascii_case(DONE_VALUE)
}

/// Splits one line into fields
///
/// A field that begins with a double quote runs until the matching closing
/// quote, with `""` standing for a literal quote. Everything else is taken
/// verbatim up to the next comma.
pub fn split_row(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;
    let mut at_field_start = true;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' if at_field_start => {
                in_quotes = true;
                at_field_start = false;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                at_field_start = true;
            }
            _ => {
                field.push(c);
                at_field_start = false;
            }
        }
    }

    fields.push(field);
    fields
}

/// Joins fields into one line, quoting where the delimiter requires it
pub fn join_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Returns true if a parsed row carries no url
pub fn is_blank(fields: &[String]) -> bool {
    fields.first().map_or(true, |f| normalize_key(f).is_empty())
}
