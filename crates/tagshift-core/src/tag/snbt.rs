//! Stringified rendering of tag trees (`{name:"x",count:3b}`), used for
//! log output and test diagnostics.

use std::fmt::{self, Display, Formatter, Write};

use super::TagValue;

impl Display for TagValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Byte(v) => write!(f, "{v}b"),
            TagValue::Short(v) => write!(f, "{v}s"),
            TagValue::Int(v) => write!(f, "{v}"),
            TagValue::Long(v) => write!(f, "{v}L"),
            TagValue::Float(v) => write!(f, "{v}f"),
            TagValue::Double(v) => write!(f, "{v}d"),
            TagValue::String(s) => write_quoted(f, s),
            TagValue::ByteArray(values) => {
                write_array(f, 'B', values.iter().map(|v| format!("{v}b")))
            }
            TagValue::IntArray(values) => write_array(f, 'I', values.iter().map(|v| v.to_string())),
            TagValue::LongArray(values) => {
                write_array(f, 'L', values.iter().map(|v| format!("{v}L")))
            }
            TagValue::List(list) => {
                f.write_char('[')?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            TagValue::Compound(map) => {
                f.write_char('{')?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_char(',')?;
                    }
                    if is_bare_key(key) {
                        f.write_str(key)?;
                    } else {
                        write_quoted(f, key)?;
                    }
                    write!(f, ":{value}")?;
                }
                f.write_char('}')
            }
        }
    }
}

fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '+'))
}

fn write_quoted(f: &mut Formatter<'_>, s: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in s.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            _ => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

fn write_array(
    f: &mut Formatter<'_>,
    prefix: char,
    items: impl Iterator<Item = String>,
) -> fmt::Result {
    write!(f, "[{prefix};")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        f.write_str(&item)?;
    }
    f.write_char(']')
}
