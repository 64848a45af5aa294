//! Typed scalar property values for block states.

use lodestone_common::binary::{BinaryReader, BinaryWriter, Serializable};
use lodestone_common::error::{LodestoneError, Result};

/// A block property value. Exactly five scalar kinds exist; anything else is
/// rejected at construction.
///
/// Ordering compares the kind first, then the value, matching the structural
/// ordering of the block property map.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PropertyValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    String(String),
}

impl PropertyValue {
    /// Render the value in the generic structured-literal (SNBT) form.
    pub fn snbt(&self) -> String {
        match self {
            PropertyValue::Byte(v) => format!("{}b", v),
            PropertyValue::Short(v) => format!("{}s", v),
            PropertyValue::Int(v) => format!("{}", v),
            PropertyValue::Long(v) => format!("{}L", v),
            PropertyValue::String(v) => quote_string(v),
        }
    }

    /// Parse a structured-literal token into a scalar property value.
    ///
    /// Accepts `true`/`false` (as bytes), integers with an optional
    /// `b`/`s`/`l` suffix, quoted strings and bare identifier strings.
    /// Literals resolving to any other tag kind (floats, lists, compounds)
    /// are rejected.
    pub fn from_snbt(literal: &str) -> Result<PropertyValue> {
        let literal = literal.trim();
        if literal.is_empty() {
            return Err(invalid(literal, "empty literal"));
        }
        if literal == "true" {
            return Ok(PropertyValue::Byte(1));
        }
        if literal == "false" {
            return Ok(PropertyValue::Byte(0));
        }
        if literal.starts_with('"') || literal.starts_with('\'') {
            return parse_quoted(literal);
        }
        if let Some(value) = parse_numeric(literal)? {
            return Ok(value);
        }
        // A bare SNBT string token.
        if literal
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '.'))
            && !literal.contains('.')
        {
            return Ok(PropertyValue::String(literal.to_string()));
        }
        Err(invalid(literal, "not a supported scalar literal"))
    }
}

fn invalid(literal: &str, reason: &str) -> LodestoneError {
    LodestoneError::InvalidArgument(format!("invalid SNBT literal {:?}: {}", literal, reason))
}

fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

fn parse_quoted(literal: &str) -> Result<PropertyValue> {
    let mut chars = literal.chars();
    let quote = chars.next().unwrap_or('"');
    let mut out = String::new();
    let mut escaped = false;
    for c in chars {
        if escaped {
            out.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Ok(PropertyValue::String(out));
        } else {
            out.push(c);
        }
    }
    Err(invalid(literal, "unterminated string"))
}

/// Parse an integer literal with an optional kind suffix. Returns `Ok(None)`
/// if the token is not numeric at all.
fn parse_numeric(literal: &str) -> Result<Option<PropertyValue>> {
    let body = literal.strip_prefix(['+', '-']).unwrap_or(literal);
    if body.is_empty() || !body.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(None);
    }
    let (digits, suffix) = match literal.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => (&literal[..literal.len() - 1], Some(c)),
        _ => (literal, None),
    };
    if !digits
        .strip_prefix(['+', '-'])
        .unwrap_or(digits)
        .chars()
        .all(|c| c.is_ascii_digit())
    {
        // Floats and malformed numbers are not valid property scalars.
        return Err(invalid(literal, "not an integer literal"));
    }
    let parse_error = |e| invalid(literal, &format!("{}", e));
    match suffix {
        Some('b') | Some('B') => Ok(Some(PropertyValue::Byte(
            digits.parse().map_err(parse_error)?,
        ))),
        Some('s') | Some('S') => Ok(Some(PropertyValue::Short(
            digits.parse().map_err(parse_error)?,
        ))),
        Some('l') | Some('L') => Ok(Some(PropertyValue::Long(
            digits.parse().map_err(parse_error)?,
        ))),
        None => Ok(Some(PropertyValue::Int(
            digits.parse().map_err(parse_error)?,
        ))),
        Some(other) => Err(invalid(literal, &format!("unsupported suffix {:?}", other))),
    }
}

// Kind tags in the binary container format, shared with the NBT tag ids.
const TAG_BYTE: u8 = 1;
const TAG_SHORT: u8 = 2;
const TAG_INT: u8 = 3;
const TAG_LONG: u8 = 4;
const TAG_STRING: u8 = 8;

impl Serializable for PropertyValue {
    fn write(&self, writer: &mut BinaryWriter) {
        match self {
            PropertyValue::Byte(v) => {
                writer.write_u8(TAG_BYTE);
                writer.write_i8(*v);
            }
            PropertyValue::Short(v) => {
                writer.write_u8(TAG_SHORT);
                writer.write_i16(*v);
            }
            PropertyValue::Int(v) => {
                writer.write_u8(TAG_INT);
                writer.write_i32(*v);
            }
            PropertyValue::Long(v) => {
                writer.write_u8(TAG_LONG);
                writer.write_i64(*v);
            }
            PropertyValue::String(v) => {
                writer.write_u8(TAG_STRING);
                writer.write_string(v);
            }
        }
    }

    fn read(reader: &mut BinaryReader) -> Result<Self> {
        match reader.read_u8()? {
            TAG_BYTE => Ok(PropertyValue::Byte(reader.read_i8()?)),
            TAG_SHORT => Ok(PropertyValue::Short(reader.read_i16()?)),
            TAG_INT => Ok(PropertyValue::Int(reader.read_i32()?)),
            TAG_LONG => Ok(PropertyValue::Long(reader.read_i64()?)),
            TAG_STRING => Ok(PropertyValue::String(reader.read_string()?)),
            tag => Err(LodestoneError::InvalidArgument(format!(
                "invalid property value tag {}",
                tag
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_snbt_rendering() {
        assert_eq!(PropertyValue::Byte(2).snbt(), "2b");
        assert_eq!(PropertyValue::Short(0).snbt(), "0s");
        assert_eq!(PropertyValue::Int(0).snbt(), "0");
        assert_eq!(PropertyValue::Long(0).snbt(), "0L");
        assert_eq!(PropertyValue::String("hi".into()).snbt(), "\"hi\"");
        assert_eq!(
            PropertyValue::String("a\"b\\c".into()).snbt(),
            "\"a\\\"b\\\\c\""
        );
    }

    #[test]
    fn test_from_snbt_booleans() {
        assert_eq!(PropertyValue::from_snbt("true").unwrap(), PropertyValue::Byte(1));
        assert_eq!(PropertyValue::from_snbt("false").unwrap(), PropertyValue::Byte(0));
    }

    #[test]
    fn test_from_snbt_numbers() {
        assert_eq!(PropertyValue::from_snbt("1b").unwrap(), PropertyValue::Byte(1));
        assert_eq!(PropertyValue::from_snbt("2s").unwrap(), PropertyValue::Short(2));
        assert_eq!(PropertyValue::from_snbt("4").unwrap(), PropertyValue::Int(4));
        assert_eq!(PropertyValue::from_snbt("8l").unwrap(), PropertyValue::Long(8));
        assert_eq!(PropertyValue::from_snbt("8L").unwrap(), PropertyValue::Long(8));
        assert_eq!(PropertyValue::from_snbt("-3").unwrap(), PropertyValue::Int(-3));
    }

    #[test]
    fn test_from_snbt_strings() {
        assert_eq!(
            PropertyValue::from_snbt("\"hi\"").unwrap(),
            PropertyValue::String("hi".into())
        );
        assert_eq!(
            PropertyValue::from_snbt("'hi'").unwrap(),
            PropertyValue::String("hi".into())
        );
        assert_eq!(
            PropertyValue::from_snbt("\"a\\\"b\"").unwrap(),
            PropertyValue::String("a\"b".into())
        );
        assert_eq!(
            PropertyValue::from_snbt("hello_world").unwrap(),
            PropertyValue::String("hello_world".into())
        );
    }

    #[test]
    fn test_from_snbt_rejects_other_kinds() {
        assert_matches!(
            PropertyValue::from_snbt("1.5"),
            Err(LodestoneError::InvalidArgument(_))
        );
        assert_matches!(
            PropertyValue::from_snbt("1.5f"),
            Err(LodestoneError::InvalidArgument(_))
        );
        assert_matches!(
            PropertyValue::from_snbt("2f"),
            Err(LodestoneError::InvalidArgument(_))
        );
        assert_matches!(
            PropertyValue::from_snbt("\"open"),
            Err(LodestoneError::InvalidArgument(_))
        );
        assert_matches!(
            PropertyValue::from_snbt("300b"),
            Err(LodestoneError::InvalidArgument(_))
        );
        assert_matches!(
            PropertyValue::from_snbt(""),
            Err(LodestoneError::InvalidArgument(_))
        );
    }

    #[test]
    fn test_serialization_round_trip() {
        use lodestone_common::binary::{from_bytes, to_bytes};
        for value in [
            PropertyValue::Byte(-1),
            PropertyValue::Short(300),
            PropertyValue::Int(70000),
            PropertyValue::Long(1 << 40),
            PropertyValue::String("waterlogged".into()),
        ] {
            let read: PropertyValue = from_bytes(&to_bytes(&value)).unwrap();
            assert_eq!(read, value);
        }
    }
}
