//! Hierarchical field and schema keys.
//!
//! A key is a chain of named segments, root first. Field keys name columns
//! (possibly through lookups) and use `/` between segments; schema keys
//! name schemas and queries and use `.`. Both share one per-segment escape
//! table so that any segment text survives the trip through the external
//! string form:
//!
//! | char | escape |
//! |------|--------|
//! | `$`  | `$D`   |
//! | `/`  | `$S`   |
//! | `&`  | `$A`   |
//! | `}`  | `$B`   |
//! | `~`  | `$T`   |
//! | `,`  | `$C`   |
//! | `.`  | `$P`   |

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Escape introducer.
const ESCAPE: char = '$';

/// Reserved characters and their escape codes, `$` first.
const ESCAPES: [(char, char); 7] = [
    ('$', 'D'),
    ('/', 'S'),
    ('&', 'A'),
    ('}', 'B'),
    ('~', 'T'),
    (',', 'C'),
    ('.', 'P'),
];

static SQL_IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][_$A-Za-z0-9]*$").expect("valid identifier regex"));

/// Words that must be quoted even when they look like plain identifiers.
const SQL_RESERVED_WORDS: &[&str] = &[
    "all", "and", "any", "array", "as", "asc", "avg", "between", "bit_and", "bit_or", "bool_and",
    "bool_or", "by", "case", "cast", "coalesce", "convert", "count", "create", "cross", "delete",
    "desc", "distinct", "drop", "else", "end", "escape", "every", "except", "exists", "false",
    "from", "full", "group", "group_concat", "having", "in", "inner", "insert", "intersect",
    "into", "is", "join", "left", "like", "limit", "max", "method", "min", "not", "null",
    "nullif", "offset", "on", "or", "order", "outer", "parameters", "pivot", "right", "select",
    "set", "some", "stddev", "stddev_samp", "sum", "table", "then", "true", "union", "unknown",
    "update", "user", "values", "variance", "var_samp", "when", "where", "with",
];

/// Escape the reserved characters of a single segment.
pub fn encode_segment(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match ESCAPES.iter().find(|(reserved, _)| *reserved == c) {
            Some((_, code)) => {
                out.push(ESCAPE);
                out.push(*code);
            }
            None => out.push(c),
        }
    }
    out
}

/// Undo [`encode_segment`]. Unknown escapes are kept verbatim.
pub fn decode_segment(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            let decoded = chars
                .peek()
                .and_then(|next| ESCAPES.iter().find(|(_, code)| code == next))
                .map(|(reserved, _)| *reserved);
            if let Some(reserved) = decoded {
                chars.next();
                out.push(reserved);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Quote a segment for SQL unless it is a bare, non-reserved identifier.
pub fn quote_sql_identifier(part: &str) -> String {
    let reserved = SQL_RESERVED_WORDS
        .iter()
        .any(|word| word.eq_ignore_ascii_case(part));
    if SQL_IDENTIFIER.is_match(part) && !reserved {
        part.to_string()
    } else {
        format!("\"{}\"", part.replace('"', "\"\""))
    }
}

/// The flavour of a key: its divider and a name for messages.
pub trait KeyKind: Clone + fmt::Debug + Send + Sync + 'static {
    /// Character placed between encoded segments.
    const DIVIDER: char;
    /// Type name used in messages and `Debug` output.
    const NAME: &'static str;
}

/// Column paths, `/` separated.
#[derive(Debug, Clone, Copy)]
pub struct FieldKind;

impl KeyKind for FieldKind {
    const DIVIDER: char = '/';
    const NAME: &'static str = "FieldKey";
}

/// Schema and query paths, `.` separated.
#[derive(Debug, Clone, Copy)]
pub struct SchemaKind;

impl KeyKind for SchemaKind {
    const DIVIDER: char = '.';
    const NAME: &'static str = "SchemaKey";
}

/// A key naming a column, possibly through lookups.
pub type FieldKey = Key<FieldKind>;

/// A key naming a schema or query.
pub type SchemaKey = Key<SchemaKind>;

/// One argument to [`Key::from_parts`]: a single name or a path of names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPart {
    /// One unencoded segment.
    Name(String),
    /// Several unencoded segments, root first.
    Path(Vec<String>),
}

impl From<&str> for KeyPart {
    fn from(name: &str) -> Self {
        KeyPart::Name(name.to_string())
    }
}

impl From<String> for KeyPart {
    fn from(name: String) -> Self {
        KeyPart::Name(name)
    }
}

impl From<Vec<String>> for KeyPart {
    fn from(path: Vec<String>) -> Self {
        KeyPart::Path(path)
    }
}

impl From<Vec<&str>> for KeyPart {
    fn from(path: Vec<&str>) -> Self {
        KeyPart::Path(path.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for KeyPart {
    fn from(path: &[&str]) -> Self {
        KeyPart::Path(path.iter().map(|s| s.to_string()).collect())
    }
}

/// An immutable hierarchical key.
///
/// Keys compare and hash by their lower-cased external string, so
/// `Foo/Bar` and `foo/bar` are the same field.
pub struct Key<K: KeyKind> {
    name: String,
    parent: Option<Arc<Key<K>>>,
    kind: PhantomData<K>,
}

impl<K: KeyKind> Key<K> {
    /// Create a root key.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            kind: PhantomData,
        }
    }

    /// Create a key one level below this one.
    pub fn child(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: Some(Arc::new(self.clone())),
            kind: PhantomData,
        }
    }

    /// Parse the external string form: split on the divider, decode each piece.
    pub fn from_external_string(s: &str) -> Self {
        let mut pieces = s.split(K::DIVIDER).map(decode_segment);
        // split always yields at least one piece
        let mut key = Self::root(pieces.next().unwrap_or_default());
        for piece in pieces {
            key = key.child(piece);
        }
        key
    }

    /// Build a key from names and name paths, left to right.
    pub fn from_parts<I>(parts: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<KeyPart>,
    {
        let mut key: Option<Self> = None;
        for (index, part) in parts.into_iter().enumerate() {
            let names = match part.into() {
                KeyPart::Name(name) => vec![name],
                KeyPart::Path(path) if path.is_empty() => {
                    return Err(Error::InvalidKeyPart {
                        index,
                        reason: format!("empty path passed to {} builder", K::NAME),
                    });
                }
                KeyPart::Path(path) => path,
            };
            for name in names {
                key = Some(match key {
                    Some(parent) => parent.child(name),
                    None => Self::root(name),
                });
            }
        }
        key.ok_or(Error::EmptyKey)
    }

    /// The unencoded last segment.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The key one level up, if any.
    pub fn parent(&self) -> Option<&Key<K>> {
        self.parent.as_deref()
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut current = self.parent();
        while let Some(key) = current {
            depth += 1;
            current = key.parent();
        }
        depth
    }

    /// Unencoded segments, root first. Never empty.
    pub fn parts(&self) -> Vec<&str> {
        let mut parts = Vec::with_capacity(self.depth());
        let mut current = Some(self);
        while let Some(key) = current {
            parts.push(key.name.as_str());
            current = key.parent();
        }
        parts.reverse();
        parts
    }

    /// Encoded segments joined by the divider.
    pub fn to_external_string(&self) -> String {
        self.parts()
            .into_iter()
            .map(encode_segment)
            .collect::<Vec<_>>()
            .join(&K::DIVIDER.to_string())
    }

    /// Unencoded segments joined by the divider, for people to read.
    pub fn to_display_string(&self) -> String {
        self.parts().join(&K::DIVIDER.to_string())
    }

    /// Segments quoted as SQL identifiers where needed, joined by `.`.
    pub fn to_sql_quoted_string(&self) -> String {
        self.parts()
            .into_iter()
            .map(quote_sql_identifier)
            .collect::<Vec<_>>()
            .join(".")
    }

    fn identity(&self) -> String {
        self.to_external_string().to_lowercase()
    }
}

impl<K: KeyKind> Clone for Key<K> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            parent: self.parent.clone(),
            kind: PhantomData,
        }
    }
}

// Unlink uniquely owned ancestors one at a time so long chains do not
// recurse on drop.
impl<K: KeyKind> Drop for Key<K> {
    fn drop(&mut self) {
        let mut parent = self.parent.take();
        while let Some(arc) = parent {
            match Arc::try_unwrap(arc) {
                Ok(mut key) => parent = key.parent.take(),
                Err(_) => break,
            }
        }
    }
}

impl<K: KeyKind> PartialEq for Key<K> {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl<K: KeyKind> Eq for Key<K> {}

impl<K: KeyKind> Hash for Key<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl<K: KeyKind> fmt::Debug for Key<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(K::NAME)
            .field(&self.to_external_string())
            .finish()
    }
}

impl<K: KeyKind> fmt::Display for Key<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_external_string())
    }
}

impl<K: KeyKind> FromStr for Key<K> {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_external_string(s))
    }
}

impl<K: KeyKind> Serialize for Key<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_external_string())
    }
}

impl<'de, K: KeyKind> Deserialize<'de> for Key<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            External(String),
            Parts(Vec<String>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::External(s) => Ok(Self::from_external_string(&s)),
            Repr::Parts(parts) => Self::from_parts(parts).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_segment_roundtrip() {
        let samples = [
            "",
            "plain",
            "$",
            "$$D",
            "a.b,c~d}e&f/g$h",
            "$P",
            "$DP",
            "trailing$",
            "with space",
            "ünïcödé/ß",
        ];
        for sample in samples {
            assert_eq!(decode_segment(&encode_segment(sample)), sample);
        }
    }

    #[test]
    fn test_encode_table() {
        assert_eq!(encode_segment(".,~}&/$"), "$P$C$T$B$A$S$D");
        assert_eq!(encode_segment("$S"), "$DS");
        assert_eq!(decode_segment("$DS"), "$S");
    }

    #[test]
    fn test_decode_keeps_unknown_escapes() {
        assert_eq!(decode_segment("$X"), "$X");
        assert_eq!(decode_segment("end$"), "end$");
    }

    #[test]
    fn test_field_key_external_roundtrip() {
        let key = FieldKey::from_parts(["Created By", "Display/Name", "a.b"]).unwrap();
        assert_eq!(key.to_external_string(), "Created By/Display$SName/a$Pb");
        let parsed = FieldKey::from_external_string(&key.to_external_string());
        assert_eq!(parsed.parts(), vec!["Created By", "Display/Name", "a.b"]);
    }

    #[test]
    fn test_schema_key_uses_dot() {
        let key = SchemaKey::from_parts(["assay", "General", "my.run"]).unwrap();
        assert_eq!(key.to_string(), "assay.General.my$Prun");
        let parsed: SchemaKey = "assay.General.my$Prun".parse().unwrap();
        assert_eq!(parsed.parts(), vec!["assay", "General", "my.run"]);
        assert_eq!(parsed.depth(), 3);
        assert_eq!(parsed.name(), "my.run");
        assert_eq!(parsed.parent().unwrap().to_string(), "assay.General");
    }

    #[test]
    fn test_case_insensitive_equality() {
        let a = FieldKey::from_external_string("Foo/Bar");
        let b = FieldKey::from_external_string("foo/bar");
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_from_parts_nested() {
        let key = FieldKey::from_parts(vec![
            KeyPart::from(vec!["a", "b"]),
            KeyPart::from("c"),
        ])
        .unwrap();
        assert_eq!(key.parts(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_from_parts_errors() {
        let err = FieldKey::from_parts(vec![KeyPart::from("a"), KeyPart::Path(vec![])]).unwrap_err();
        assert!(matches!(err, Error::InvalidKeyPart { index: 1, .. }));

        let err = FieldKey::from_parts(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, Error::EmptyKey));
    }

    #[test]
    fn test_sql_quoting() {
        assert_eq!(quote_sql_identifier("select"), "\"select\"");
        assert_eq!(quote_sql_identifier("myCol1"), "myCol1");
        assert_eq!(quote_sql_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(quote_sql_identifier("1abc"), "\"1abc\"");
        assert_eq!(quote_sql_identifier("has space"), "\"has space\"");

        let key = FieldKey::from_parts(["Lookup", "Where", "val$1"]).unwrap();
        assert_eq!(key.to_sql_quoted_string(), "Lookup.\"Where\".val$1");
    }

    #[test]
    fn test_display_string_is_unencoded() {
        let key = FieldKey::from_parts(["a/b", "c"]).unwrap();
        assert_eq!(key.to_display_string(), "a/b/c");
        assert_eq!(key.to_external_string(), "a$Sb/c");
    }

    #[test]
    fn test_serde_forms() {
        let key = FieldKey::from_parts(["Run", "Name.x"]).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"Run/Name$Px\"");

        let from_string: FieldKey = serde_json::from_str("\"Run/Name$Px\"").unwrap();
        let from_array: FieldKey = serde_json::from_str(r#"["Run","Name.x"]"#).unwrap();
        assert_eq!(from_string, key);
        assert_eq!(from_array, key);
        assert!(serde_json::from_str::<FieldKey>("[]").is_err());
    }

    #[test]
    fn test_long_chain_does_not_recurse() {
        let key = FieldKey::from_external_string(&"a/".repeat(100_000));
        assert_eq!(key.depth(), 100_001);
        assert_eq!(key.parts().len(), 100_001);
        assert_eq!(key, key.clone());

        let parent = key.parent().cloned();
        drop(key);
        assert_eq!(parent.map(|p| p.depth()), Some(100_000));
    }
}
