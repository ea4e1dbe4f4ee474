// ABOUTME: MySQL value to SQL literal conversion for dumped rows
// ABOUTME: Maps driver values onto the closed Null/Text/Temporal/Raw model

use crate::dump::literal::{SqlLiteral, Timestamp};
use mysql_async::{Row, Value};

/// Convert a binary-protocol MySQL value to the literal written into `data.sql`
///
/// - NULL → `NULL`
/// - Bytes (CHAR/TEXT/BLOB/DECIMAL/JSON...) → quoted, escaped text
/// - Date/Datetime/Timestamp → quoted `YYYY-MM-DD HH:MM:SS`
/// - TIME → quoted `[-]HH:MM:SS[.ffffff]`, days folded into hours
/// - Integers and floats → unquoted decimal text
///
/// # Examples
///
/// ```
/// # use mysql_async::Value;
/// # use mysql_exporter::mysql::converter::mysql_value_to_literal;
/// assert_eq!(mysql_value_to_literal(&Value::Int(42)).to_sql(), "42");
/// assert_eq!(mysql_value_to_literal(&Value::NULL).to_sql(), "NULL");
/// ```
pub fn mysql_value_to_literal(value: &Value) -> SqlLiteral {
    match value {
        Value::NULL => SqlLiteral::Null,

        Value::Bytes(bytes) => SqlLiteral::Text(bytes.clone()),

        Value::Int(i) => SqlLiteral::raw(i),
        Value::UInt(u) => SqlLiteral::raw(u),
        Value::Float(f) => SqlLiteral::raw(f),
        Value::Double(d) => SqlLiteral::raw(d),

        Value::Date(year, month, day, hour, minute, second, _micros) => {
            SqlLiteral::Temporal(Timestamp {
                year: *year,
                month: *month,
                day: *day,
                hour: *hour,
                minute: *minute,
                second: *second,
            })
        }

        Value::Time(is_negative, days, hours, minutes, seconds, micros) => {
            let sign = if *is_negative { "-" } else { "" };
            let total_hours = *days as u64 * 24 + *hours as u64;
            let mut text = format!("{}{:02}:{:02}:{:02}", sign, total_hours, minutes, seconds);
            if *micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            SqlLiteral::Text(text.into_bytes())
        }
    }
}

/// Convert every column of `row`, in result-set order
pub fn mysql_row_to_literals(row: &Row) -> Vec<SqlLiteral> {
    (0..row.len())
        .map(|idx| {
            row.as_ref(idx)
                .map(mysql_value_to_literal)
                .unwrap_or(SqlLiteral::Null)
        })
        .collect()
}
