// ABOUTME: SQL literal rendering for dumped row values
// ABOUTME: Closed value model, MySQL string escaping and identifier quoting

use std::fmt;

/// Calendar timestamp rendered as `YYYY-MM-DD HH:MM:SS`.
///
/// Plain fields so MySQL zero dates (`0000-00-00`) survive the dump unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// One column value of a dumped row
#[derive(Debug, Clone, PartialEq)]
pub enum SqlLiteral {
    /// Unquoted `NULL`
    Null,
    /// Character or binary data, quoted and escaped
    Text(Vec<u8>),
    /// Date/time value, quoted as `YYYY-MM-DD HH:MM:SS`
    Temporal(Timestamp),
    /// Written as-is (numbers)
    Raw(String),
}

impl SqlLiteral {
    pub fn text(value: impl Into<Vec<u8>>) -> Self {
        SqlLiteral::Text(value.into())
    }

    pub fn raw(value: impl ToString) -> Self {
        SqlLiteral::Raw(value.to_string())
    }

    /// Append the SQL form of this value to `out`
    pub fn write_to(&self, out: &mut Vec<u8>) {
        match self {
            SqlLiteral::Null => out.extend_from_slice(b"NULL"),
            SqlLiteral::Text(bytes) => {
                out.push(b'\'');
                escape_bytes(bytes, out);
                out.push(b'\'');
            }
            SqlLiteral::Temporal(ts) => {
                out.push(b'\'');
                out.extend_from_slice(ts.to_string().as_bytes());
                out.push(b'\'');
            }
            SqlLiteral::Raw(text) => out.extend_from_slice(text.as_bytes()),
        }
    }

    /// SQL form as a string; binary content is decoded lossily
    pub fn to_sql(&self) -> String {
        let mut out = Vec::new();
        self.write_to(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }
}

/// Append `row` as `v1, v2, ...` (without the surrounding parentheses)
pub fn write_row(row: &[SqlLiteral], out: &mut Vec<u8>) {
    for (idx, value) in row.iter().enumerate() {
        if idx > 0 {
            out.extend_from_slice(b", ");
        }
        value.write_to(out);
    }
}

fn escape_sequence(byte: u8) -> Option<&'static str> {
    match byte {
        b'\\' => Some("\\\\"),
        b'\'' => Some("\\'"),
        b'"' => Some("\\\""),
        b'\n' => Some("\\n"),
        b'\r' => Some("\\r"),
        b'\t' => Some("\\t"),
        0x08 => Some("\\b"),
        0x0c => Some("\\f"),
        0x00 => Some("\\0"),
        _ => None,
    }
}

/// Escape `input` for use inside a single-quoted MySQL string literal.
///
/// Only ASCII bytes are rewritten, so UTF-8 sequences and arbitrary binary
/// data pass through untouched.
pub fn escape_bytes(input: &[u8], out: &mut Vec<u8>) {
    for &byte in input {
        match escape_sequence(byte) {
            Some(seq) => out.extend_from_slice(seq.as_bytes()),
            None => out.push(byte),
        }
    }
}

/// String form of [`escape_bytes`]
///
/// # Examples
///
/// ```
/// # use mysql_exporter::dump::literal::escape_string;
/// assert_eq!(escape_string("it's"), "it\\'s");
/// assert_eq!(escape_string("a\nb"), "a\\nb");
/// ```
pub fn escape_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        let seq = if ch.is_ascii() {
            escape_sequence(ch as u8)
        } else {
            None
        };
        match seq {
            Some(seq) => out.push_str(seq),
            None => out.push(ch),
        }
    }
    out
}

/// Backtick-quote an identifier, doubling embedded backticks
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// `` `a`, `b`, `c` `` for an INSERT column list
pub fn column_list(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ")
}
