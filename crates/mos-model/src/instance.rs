//! Managed-object instances, from raw parsed attributes to resolved records.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Where an instance came from: table name plus instance column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceColumn {
    pub table: String,
    pub index: usize,
    pub header: String,
}

impl fmt::Display for SourceColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", self.table, self.header)
    }
}

/// Attributes of one (object type, column) accumulator as produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInstance {
    pub object_type: String,
    pub source: SourceColumn,
    /// Position among instances of the same object type packed into the same column.
    pub ordinal: usize,
    /// Normalized values in source row order. Values are never empty.
    pub attributes: IndexMap<String, String>,
}

impl RawInstance {
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.attributes.get(attribute).map(String::as_str)
    }
}

/// How an instance obtained its identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdSource {
    /// The policy's canonical id attribute.
    IdAttribute,
    /// The first attribute whose name ends in the identifier delimiter.
    IdentifierRow,
    /// The originating column header (last resort).
    ColumnHeader,
}

/// Sub-key/value pairs collapsed from several `base<delim>sub` rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompoundAttribute {
    pub base: String,
    /// One entry per repeated group; a plain compound has exactly one group.
    pub groups: Vec<Vec<(String, String)>>,
    /// Tag every pair with a type marker (`sub:b=` for booleans, `sub:i=` otherwise).
    pub typed: bool,
    /// Render one line per pair instead of one joined value.
    pub per_sub_key: bool,
    /// Separator placed between repeated groups.
    pub group_joiner: String,
}

impl CompoundAttribute {
    pub fn new(base: impl Into<String>, pairs: Vec<(String, String)>) -> Self {
        Self {
            base: base.into(),
            groups: vec![pairs],
            typed: false,
            per_sub_key: false,
            group_joiner: ";".to_string(),
        }
    }

    fn render_pair(&self, key: &str, value: &str) -> String {
        let rendered = quote_sub_value(value, &self.group_joiner);
        if self.typed {
            let marker = if is_boolean(value) { 'b' } else { 'i' };
            format!("{key}:{marker}={rendered}")
        } else {
            format!("{key}={rendered}")
        }
    }

    /// Single serialized value: `k1=v1,k2=v2` with groups joined by the group joiner.
    pub fn render(&self) -> String {
        self.groups
            .iter()
            .map(|group| {
                group
                    .iter()
                    .map(|(key, value)| self.render_pair(key, value))
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect::<Vec<_>>()
            .join(&self.group_joiner)
    }

    /// One `key=value` fragment per pair, in group order.
    pub fn pair_fragments(&self) -> Vec<String> {
        self.groups
            .iter()
            .flatten()
            .map(|(key, value)| self.render_pair(key, value))
            .collect()
    }

    /// Split a serialized compound value back into its groups of pairs.
    ///
    /// Type markers (`:b`, `:i`) on keys are removed. Fragments without `=`
    /// are kept with an empty value. Quoted sub-values are unquoted and may
    /// contain any delimiter.
    pub fn parse(serialized: &str, group_joiner: &str) -> Vec<Vec<(String, String)>> {
        if serialized.is_empty() {
            return Vec::new();
        }
        let groups: Vec<&str> = if group_joiner.is_empty() {
            vec![serialized]
        } else {
            split_unquoted(serialized, group_joiner)
        };
        groups
            .into_iter()
            .map(|group| {
                split_unquoted(group, ",")
                    .into_iter()
                    .filter(|fragment| !fragment.is_empty())
                    .map(|fragment| {
                        let (key, value) = fragment.split_once('=').unwrap_or((fragment, ""));
                        let key = key
                            .strip_suffix(":b")
                            .or_else(|| key.strip_suffix(":i"))
                            .unwrap_or(key);
                        (key.to_string(), unquote_sub_value(value))
                    })
                    .collect()
            })
            .collect()
    }
}

fn is_boolean(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

/// Wrap a sub-value in double quotes when it holds a pair or group delimiter.
/// Embedded quotes are doubled.
fn quote_sub_value(value: &str, group_joiner: &str) -> String {
    let needs_quotes = value.contains([',', '=', '"'])
        || (!group_joiner.is_empty() && value.contains(group_joiner));
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn unquote_sub_value(value: &str) -> String {
    match value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
    {
        Some(inner) => inner.replace("\"\"", "\""),
        None => value.to_string(),
    }
}

/// Split on `separator` wherever it falls outside a quoted run.
fn split_unquoted<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut quoted = false;
    let mut start = 0;
    let mut index = 0;
    while index < text.len() {
        let rest = &text[index..];
        if rest.starts_with('"') {
            quoted = !quoted;
            index += 1;
        } else if !quoted && rest.starts_with(separator) {
            parts.push(&text[start..index]);
            index += separator.len();
            start = index;
        } else {
            index += rest.chars().next().map_or(1, char::len_utf8);
        }
    }
    parts.push(&text[start..]);
    parts
}

/// Outcome of resolving a reference against the instance set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Fully qualified MO path of the referenced instance.
    Resolved(String),
    /// The target was not found; carries the placeholder to emit instead.
    Unresolved(String),
}

/// A directional link from one instance to another object type/instance id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub target_type: String,
    pub target_id: String,
    pub resolution: Resolution,
}

impl Reference {
    pub fn is_resolved(&self) -> bool {
        matches!(self.resolution, Resolution::Resolved(_))
    }

    pub fn render(&self) -> &str {
        match &self.resolution {
            Resolution::Resolved(path) | Resolution::Unresolved(path) => path,
        }
    }
}

/// A resolved attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AttributeValue {
    Scalar(String),
    Compound(CompoundAttribute),
    Reference(Reference),
}

impl AttributeValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        Self::Scalar(value.into())
    }

    /// The single-line textual form of the value.
    pub fn render(&self) -> String {
        match self {
            Self::Scalar(value) => value.clone(),
            Self::Compound(compound) => compound.render(),
            Self::Reference(reference) => reference.render().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Scalar(value) => value.is_empty(),
            Self::Compound(compound) => compound.groups.iter().all(Vec::is_empty),
            Self::Reference(reference) => reference.render().is_empty(),
        }
    }
}

/// A fully resolved managed-object instance. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    pub object_type: String,
    pub instance_id: String,
    pub id_source: IdSource,
    /// Fully qualified MO path (`parent,ObjectType=id`).
    pub path: String,
    pub source: SourceColumn,
    pub ordinal: usize,
    pub attributes: IndexMap<String, AttributeValue>,
    /// Attributes that only carry identity and are never auto-emitted.
    pub identity: BTreeSet<String>,
}

impl InstanceRecord {
    pub fn get(&self, attribute: &str) -> Option<&AttributeValue> {
        self.attributes.get(attribute)
    }

    pub fn is_identity(&self, attribute: &str) -> bool {
        self.identity.contains(attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn compound_renders_joined_pairs() {
        let compound = CompoundAttribute::new("pos", pairs(&[("x", "1"), ("y", "2")]));
        assert_eq!(compound.render(), "x=1,y=2");
        assert_eq!(compound.pair_fragments(), vec!["x=1", "y=2"]);
    }

    #[test]
    fn typed_compound_tags_values() {
        let mut compound = CompoundAttribute::new(
            "changeNotification",
            pairs(&[("changeNotificationSIB1", "true"), ("changeNotificationSIB2", "4")]),
        );
        compound.typed = true;
        assert_eq!(
            compound.render(),
            "changeNotificationSIB1:b=true,changeNotificationSIB2:i=4"
        );
    }

    #[test]
    fn repeated_groups_join_with_group_joiner() {
        let compound = CompoundAttribute {
            base: "eutranCellPolygon".to_string(),
            groups: vec![
                pairs(&[("cornerLatitude", "1"), ("cornerLongitude", "4")]),
                pairs(&[("cornerLatitude", "2"), ("cornerLongitude", "5")]),
            ],
            typed: false,
            per_sub_key: false,
            group_joiner: ";".to_string(),
        };
        assert_eq!(
            compound.render(),
            "cornerLatitude=1,cornerLongitude=4;cornerLatitude=2,cornerLongitude=5"
        );
        assert_eq!(CompoundAttribute::parse(&compound.render(), ";"), compound.groups);
    }

    #[test]
    fn delimiters_inside_sub_values_are_quoted() {
        let mut compound = CompoundAttribute::new(
            "plmn",
            pairs(&[("a", "mcc=716,mnc=10"), ("b", "x"), ("c", r#"say "hi";"#)]),
        );
        assert_eq!(compound.render(), r#"a="mcc=716,mnc=10",b=x,c="say ""hi"";""#);
        assert_eq!(CompoundAttribute::parse(&compound.render(), ";"), compound.groups);

        compound.typed = true;
        assert_eq!(compound.pair_fragments()[0], r#"a:i="mcc=716,mnc=10""#);
        assert_eq!(CompoundAttribute::parse(&compound.render(), ";"), compound.groups);
    }

    #[test]
    fn parse_strips_type_markers() {
        let parsed = CompoundAttribute::parse("a:b=true,b:i=3", ";");
        assert_eq!(parsed, vec![pairs(&[("a", "true"), ("b", "3")])]);
    }

    #[test]
    fn unresolved_reference_renders_placeholder() {
        let reference = Reference {
            target_type: "SectorCarrier".to_string(),
            target_id: "NOPE".to_string(),
            resolution: Resolution::Unresolved("UNKNOWN_NOPE".to_string()),
        };
        assert!(!reference.is_resolved());
        assert_eq!(AttributeValue::Reference(reference).render(), "UNKNOWN_NOPE");
    }

    #[test]
    fn attribute_value_serializes_with_kind_tag() {
        let value = AttributeValue::scalar("red");
        let json = serde_json::to_string(&value).expect("serialize value");
        assert_eq!(json, r#"{"kind":"scalar","value":"red"}"#);
    }
}
