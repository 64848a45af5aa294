//! Parsing and serialization of the textual blockstate formats.
//!
//! Two grammars exist. The Java grammar uses bare tokens and string-only
//! property values, `minecraft:oak_log[axis=y]`. The Bedrock grammar quotes
//! property names and carries typed scalar literals,
//! `minecraft:log["pillar_axis"="y"]`.

use lodestone_common::error::{LodestoneError, Result};
use lodestone_version::VersionNumber;

use crate::block::{Block, BlockProperties};
use crate::property::PropertyValue;

const DEFAULT_NAMESPACE: &str = "minecraft";

impl Block {
    /// Parse a Java format blockstate string.
    ///
    /// The namespace defaults to `minecraft` when omitted. All property
    /// values parse as strings, `[level=0]` included.
    pub fn from_java_blockstate(
        platform: impl Into<String>,
        version: VersionNumber,
        blockstate: &str,
    ) -> Result<Block> {
        let (name, property_text) = split_blockstate(blockstate)?;
        let (namespace, base_name) = split_name(name, blockstate)?;
        let mut properties = BlockProperties::new();
        if let Some(text) = property_text {
            for entry in split_properties(text, blockstate)? {
                let (key, value) = split_entry(entry, blockstate)?;
                if !is_java_token(key) || !is_java_token(value) {
                    return Err(invalid(blockstate));
                }
                properties.insert(key.to_string(), PropertyValue::String(value.to_string()));
            }
        }
        Ok(Block::with_properties(
            platform, version, namespace, base_name, properties,
        ))
    }

    /// Serialize to the Java format blockstate string.
    ///
    /// Only string valued properties are representable in this grammar;
    /// others are skipped. Properties appear in lexicographic key order.
    pub fn java_blockstate(&self) -> String {
        let mut out = self.namespaced_name();
        let mut first = true;
        for (name, value) in self.properties() {
            if let PropertyValue::String(value) = value {
                out.push(if first { '[' } else { ',' });
                first = false;
                out.push_str(name);
                out.push('=');
                out.push_str(value);
            }
        }
        if !first {
            out.push(']');
        }
        out
    }

    /// Parse a Bedrock format blockstate string.
    ///
    /// Property names are quoted and values are typed scalar literals, so
    /// `["age"=2b]` yields a byte property.
    pub fn from_bedrock_blockstate(
        platform: impl Into<String>,
        version: VersionNumber,
        blockstate: &str,
    ) -> Result<Block> {
        let (name, entries) = split_bedrock_blockstate(blockstate)?;
        let (namespace, base_name) = split_name(name, blockstate)?;
        let mut properties = BlockProperties::new();
        for entry in entries {
            let (key, value) = split_entry(entry, blockstate)?;
            let key = unquote_key(key).ok_or_else(|| invalid(blockstate))?;
            let value = PropertyValue::from_snbt(value).map_err(|_| invalid(blockstate))?;
            properties.insert(key, value);
        }
        Ok(Block::with_properties(
            platform, version, namespace, base_name, properties,
        ))
    }

    /// Serialize to the Bedrock format blockstate string.
    ///
    /// Byte values zero and one render as `false` and `true`. Properties
    /// appear in lexicographic key order.
    pub fn bedrock_blockstate(&self) -> String {
        let mut out = self.namespaced_name();
        let mut first = true;
        for (name, value) in self.properties() {
            out.push(if first { '[' } else { ',' });
            first = false;
            out.push('"');
            out.push_str(name);
            out.push_str("\"=");
            out.push_str(&match value {
                PropertyValue::Byte(0) => "false".to_string(),
                PropertyValue::Byte(1) => "true".to_string(),
                other => other.snbt(),
            });
        }
        if !first {
            out.push(']');
        }
        out
    }
}

fn invalid(blockstate: &str) -> LodestoneError {
    LodestoneError::InvalidArgument(format!("invalid blockstate {:?}", blockstate))
}

/// Split `ns:name[props]` into the name part and the optional property text.
fn split_blockstate<'a>(blockstate: &'a str) -> Result<(&'a str, Option<&'a str>)> {
    match blockstate.find('[') {
        Some(open) => {
            let rest = &blockstate[open + 1..];
            let close = rest.find(']').ok_or_else(|| invalid(blockstate))?;
            if close != rest.len() - 1 {
                return Err(invalid(blockstate));
            }
            Ok((&blockstate[..open], Some(&rest[..close])))
        }
        None => {
            if blockstate.contains(']') {
                return Err(invalid(blockstate));
            }
            Ok((blockstate, None))
        }
    }
}

/// Split `ns:name` into namespace and base name, defaulting the namespace.
fn split_name<'a>(name: &'a str, blockstate: &str) -> Result<(&'a str, &'a str)> {
    let (namespace, base_name) = match name.split_once(':') {
        Some((namespace, base_name)) => (namespace, base_name),
        None => (DEFAULT_NAMESPACE, name),
    };
    if !is_java_token(namespace) || !is_java_token(base_name) {
        return Err(invalid(blockstate));
    }
    Ok((namespace, base_name))
}

fn split_properties<'a>(text: &'a str, blockstate: &str) -> Result<Vec<&'a str>> {
    if text.is_empty() {
        return Err(invalid(blockstate));
    }
    Ok(text.split(',').collect())
}

/// Split `ns:name["key"=literal,...]` into the name part and the property
/// entries.
fn split_bedrock_blockstate(blockstate: &str) -> Result<(&str, Vec<&str>)> {
    match blockstate.find('[') {
        Some(open) => {
            let entries = tokenize_quoted_properties(&blockstate[open + 1..], blockstate)?;
            Ok((&blockstate[..open], entries))
        }
        None => {
            if blockstate.contains(']') {
                return Err(invalid(blockstate));
            }
            Ok((blockstate, Vec::new()))
        }
    }
}

/// Split the bracketed property text on commas. Commas, brackets and quote
/// characters inside a quoted string belong to the string, so a value may
/// contain any of them.
fn tokenize_quoted_properties<'a>(text: &'a str, blockstate: &str) -> Result<Vec<&'a str>> {
    let mut entries = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            ',' => {
                entries.push(&text[start..i]);
                start = i + 1;
            }
            ']' => {
                // The closing bracket must end the blockstate.
                if i + 1 != text.len() {
                    return Err(invalid(blockstate));
                }
                entries.push(&text[start..i]);
                return Ok(entries);
            }
            _ => {}
        }
    }
    Err(invalid(blockstate))
}

fn split_entry<'a>(entry: &'a str, blockstate: &str) -> Result<(&'a str, &'a str)> {
    entry.split_once('=').ok_or_else(|| invalid(blockstate))
}

fn is_java_token(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip the required double quotes from a Bedrock property name.
fn unquote_key(key: &str) -> Option<String> {
    let inner = key.strip_prefix('"')?.strip_suffix('"')?;
    if is_java_token(inner) {
        Some(inner.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn version() -> VersionNumber {
        VersionNumber::from([3578])
    }

    #[test]
    fn test_java_blockstate_parsing() {
        let block = Block::from_java_blockstate("java", version(), "minecraft:water[level=0]")
            .unwrap();
        assert_eq!(block.namespace(), "minecraft");
        assert_eq!(block.base_name(), "water");
        assert_eq!(
            block.properties().get("level"),
            Some(&PropertyValue::String("0".to_string()))
        );

        let block = Block::from_java_blockstate("java", version(), "stone").unwrap();
        assert_eq!(block.namespace(), "minecraft");
        assert_eq!(block.base_name(), "stone");
        assert!(block.properties().is_empty());

        let block = Block::from_java_blockstate(
            "java",
            version(),
            "minecraft:oak_log[axis=y,stripped=false]",
        )
        .unwrap();
        assert_eq!(
            block.properties().get("axis"),
            Some(&PropertyValue::String("y".to_string()))
        );
        assert_eq!(
            block.properties().get("stripped"),
            Some(&PropertyValue::String("false".to_string()))
        );
    }

    #[test]
    fn test_java_blockstate_rejects_malformed_input() {
        for blockstate in [
            "a:", "a:b[", "a:b]", "a:b[c]", "[a=b]", "a:b[=b]", "a:b[c=]", "a:b[]",
            "a:b[c=d]e", ":b", "a:b[c=d,]",
        ] {
            assert_matches!(
                Block::from_java_blockstate("java", version(), blockstate),
                Err(LodestoneError::InvalidArgument(_)),
                "{:?} should not parse",
                blockstate
            );
        }
    }

    #[test]
    fn test_java_blockstate_serialization() {
        let block = Block::from_java_blockstate(
            "java",
            version(),
            "minecraft:oak_log[stripped=false,axis=y]",
        )
        .unwrap();
        assert_eq!(
            block.java_blockstate(),
            "minecraft:oak_log[axis=y,stripped=false]"
        );

        let block = Block::new("java", version(), "minecraft", "stone");
        assert_eq!(block.java_blockstate(), "minecraft:stone");
    }

    #[test]
    fn test_java_blockstate_skips_non_string_properties() {
        let block = Block::with_properties(
            "java",
            version(),
            "minecraft",
            "thing",
            BlockProperties::from([
                ("age".to_string(), PropertyValue::Byte(2)),
                ("kind".to_string(), PropertyValue::String("red".to_string())),
            ]),
        );
        assert_eq!(block.java_blockstate(), "minecraft:thing[kind=red]");
    }

    #[test]
    fn test_bedrock_blockstate_round_trip() {
        // Byte values outside {0, 1} keep the numeric rendering; zero and
        // one always render as the booleans.
        let blockstate = "minecraft:test[\"ByteTag\"=2b,\"IntTag\"=4,\"LongTag\"=8L,\
\"ShortTag\"=2s,\"StringTag\"=\"hi\",\"false\"=false,\"true\"=true]";
        let block =
            Block::from_bedrock_blockstate("bedrock", version(), blockstate).unwrap();
        assert_eq!(
            block.properties().get("ByteTag"),
            Some(&PropertyValue::Byte(2))
        );
        assert_eq!(
            block.properties().get("ShortTag"),
            Some(&PropertyValue::Short(2))
        );
        assert_eq!(block.properties().get("IntTag"), Some(&PropertyValue::Int(4)));
        assert_eq!(
            block.properties().get("LongTag"),
            Some(&PropertyValue::Long(8))
        );
        assert_eq!(
            block.properties().get("StringTag"),
            Some(&PropertyValue::String("hi".to_string()))
        );
        assert_eq!(block.properties().get("false"), Some(&PropertyValue::Byte(0)));
        assert_eq!(block.properties().get("true"), Some(&PropertyValue::Byte(1)));
        assert_eq!(block.bedrock_blockstate(), blockstate);
    }

    #[test]
    fn test_bedrock_blockstate_serialization() {
        let block = Block::with_properties(
            "bedrock",
            version(),
            "minecraft",
            "log",
            BlockProperties::from([
                ("c".to_string(), PropertyValue::Byte(2)),
                ("d".to_string(), PropertyValue::Short(0)),
                ("e".to_string(), PropertyValue::Int(0)),
                ("f".to_string(), PropertyValue::Long(0)),
                (
                    "g".to_string(),
                    PropertyValue::String("helloworld".to_string()),
                ),
            ]),
        );
        assert_eq!(
            block.bedrock_blockstate(),
            "minecraft:log[\"c\"=2b,\"d\"=0s,\"e\"=0,\"f\"=0L,\"g\"=\"helloworld\"]"
        );
    }

    #[test]
    fn test_bedrock_blockstate_quoted_values_may_contain_delimiters() {
        let blockstate = "minecraft:sign[\"text\"=\"a,b]c\"]";
        let block =
            Block::from_bedrock_blockstate("bedrock", version(), blockstate).unwrap();
        assert_eq!(
            block.properties().get("text"),
            Some(&PropertyValue::String("a,b]c".to_string()))
        );
        assert_eq!(block.bedrock_blockstate(), blockstate);

        let block = Block::from_bedrock_blockstate(
            "bedrock",
            version(),
            "minecraft:sign[\"a\"=\"say \\\"hi\\\"\",\"b\"=1]",
        )
        .unwrap();
        assert_eq!(
            block.properties().get("a"),
            Some(&PropertyValue::String("say \"hi\"".to_string()))
        );
        assert_eq!(block.properties().get("b"), Some(&PropertyValue::Int(1)));

        // A bracket outside any quotes still terminates the blockstate.
        assert_matches!(
            Block::from_bedrock_blockstate("bedrock", version(), "a:b[\"c\"=1]junk"),
            Err(LodestoneError::InvalidArgument(_))
        );
        assert_matches!(
            Block::from_bedrock_blockstate("bedrock", version(), "a:b[\"c\"=\"open]"),
            Err(LodestoneError::InvalidArgument(_))
        );
    }

    #[test]
    fn test_bedrock_blockstate_rejects_unquoted_keys() {
        assert_matches!(
            Block::from_bedrock_blockstate("bedrock", version(), "minecraft:log[axis=y]"),
            Err(LodestoneError::InvalidArgument(_))
        );
    }
}
