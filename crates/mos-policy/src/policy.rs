//! The per-object-type rule record.
//!
//! An [`OrderingPolicy`] is plain data: it says which attributes are emitted,
//! in which order, with which fallbacks, and in which structural form. No
//! object type gets code of its own; the engine interprets these records.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use mos_model::EmissionMode;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, Result};

fn default_true() -> bool {
    true
}

/// Ordering applied to the sub-keys of a compound attribute.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompoundSort {
    /// Numeric suffix when one is present (`SIB2` before `SIB10`), else lexical.
    #[default]
    Natural,
    Lexical,
    /// Source row order.
    Source,
    /// Ranked by [`CompoundRule::order`]; unlisted keys follow, lexically.
    Fixed,
}

/// How rows sharing a `base<delim>` prefix collapse into one value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompoundRule {
    pub sort: CompoundSort,
    /// Sub-key ranking for [`CompoundSort::Fixed`]; entries match by prefix.
    pub order: Vec<String>,
    pub typed: bool,
    pub per_sub_key: bool,
    /// When set, every sub-value is a list split on this separator and the
    /// lists are zipped into repeated groups.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat_separator: Option<String>,
    pub group_joiner: String,
}

impl Default for CompoundRule {
    fn default() -> Self {
        Self {
            sort: CompoundSort::default(),
            order: Vec::new(),
            typed: false,
            per_sub_key: false,
            repeat_separator: None,
            group_joiner: ";".to_string(),
        }
    }
}

impl CompoundRule {
    pub fn with_sort(mut self, sort: CompoundSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort = CompoundSort::Fixed;
        self.order = order.into_iter().map(Into::into).collect();
        self
    }

    pub fn typed(mut self) -> Self {
        self.typed = true;
        self
    }

    pub fn per_sub_key(mut self) -> Self {
        self.per_sub_key = true;
        self
    }

    pub fn repeated(mut self, separator: impl Into<String>) -> Self {
        self.repeat_separator = Some(separator.into());
        self
    }
}

/// A compiled regular expression applied to a column header.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HeaderPattern(Regex);

impl HeaderPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|source| PolicyError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// First capture group, or the whole match when the pattern has no groups.
    pub fn extract<'h>(&self, header: &'h str) -> Option<&'h str> {
        let captures = self.0.captures(header)?;
        captures
            .get(1)
            .or_else(|| captures.get(0))
            .map(|m| m.as_str())
    }
}

impl TryFrom<String> for HeaderPattern {
    type Error = PolicyError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<HeaderPattern> for String {
    fn from(value: HeaderPattern) -> Self {
        value.0.as_str().to_string()
    }
}

impl PartialEq for HeaderPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for HeaderPattern {}

impl fmt::Debug for HeaderPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HeaderPattern").field(&self.as_str()).finish()
    }
}

/// Where the target instance id of a reference comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceSource {
    /// The attribute value is the target id (or a path ending in `Type=id`).
    #[default]
    ById,
    /// The id is extracted from the instance's column header.
    FromHeader,
}

/// Marks an attribute as a pointer to an instance of another object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceRule {
    pub target: String,
    #[serde(default)]
    pub source: ReferenceSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<HeaderPattern>,
    /// Check the target against the resolved set; non-strict references are
    /// formatted without lookup.
    #[serde(default = "default_true")]
    pub strict: bool,
    /// Attributes copied from the target instance when the referrer lacks them.
    #[serde(default)]
    pub borrow: Vec<String>,
}

impl ReferenceRule {
    pub fn by_id(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            source: ReferenceSource::ById,
            pattern: None,
            strict: true,
            borrow: Vec::new(),
        }
    }

    pub fn from_header(target: impl Into<String>, pattern: HeaderPattern) -> Self {
        Self {
            target: target.into(),
            source: ReferenceSource::FromHeader,
            pattern: Some(pattern),
            strict: true,
            borrow: Vec::new(),
        }
    }

    pub fn lenient(mut self) -> Self {
        self.strict = false;
        self
    }

    pub fn with_borrow<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.borrow = attributes.into_iter().map(Into::into).collect();
        self
    }
}

/// Rendering rules for one object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderingPolicy {
    pub object_type: String,
    /// Path prefix of the parent MO (`ENodeBFunction=1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub mode: EmissionMode,
    /// Canonical identifier attribute; defaults to `<lowerCamelType>Id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_attribute: Option<String>,
    /// Declared attribute order; entries also match as prefixes.
    #[serde(default)]
    pub order: Vec<String>,
    /// Emitted with an empty value when absent.
    #[serde(default)]
    pub mandatory: BTreeSet<String>,
    /// Never emitted.
    #[serde(default)]
    pub exclude: BTreeSet<String>,
    /// Drop attributes that the order list does not name.
    #[serde(default)]
    pub closed: bool,
    /// Attributes set inside the creation block of `create-named-block`.
    #[serde(default)]
    pub inline: Vec<String>,
    /// Attribute pulled up to directly follow the path header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_line: Option<String>,
    /// Emit `ld <path>` before creating.
    #[serde(default)]
    pub load_first: bool,
    #[serde(default)]
    pub defaults: BTreeMap<String, String>,
    /// Source attribute name to emitted name.
    #[serde(default)]
    pub renames: BTreeMap<String, String>,
    /// Per-attribute value substitutions.
    #[serde(default)]
    pub rewrites: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default = "default_true")]
    pub compound_grouping: bool,
    /// Compound bases kept as separate flat attributes.
    #[serde(default)]
    pub flat: BTreeSet<String>,
    #[serde(default)]
    pub compounds: BTreeMap<String, CompoundRule>,
    #[serde(default)]
    pub references: BTreeMap<String, ReferenceRule>,
}

impl OrderingPolicy {
    pub fn new(object_type: impl Into<String>) -> Self {
        Self {
            object_type: object_type.into(),
            parent: None,
            mode: EmissionMode::default(),
            id_attribute: None,
            order: Vec::new(),
            mandatory: BTreeSet::new(),
            exclude: BTreeSet::new(),
            closed: false,
            inline: Vec::new(),
            reference_line: None,
            load_first: false,
            defaults: BTreeMap::new(),
            renames: BTreeMap::new(),
            rewrites: BTreeMap::new(),
            compound_grouping: true,
            flat: BTreeSet::new(),
            compounds: BTreeMap::new(),
            references: BTreeMap::new(),
        }
    }

    pub fn with_mode(mut self, mode: EmissionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_id_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.id_attribute = Some(attribute.into());
        self
    }

    pub fn with_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = order.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_mandatory<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mandatory.extend(attributes.into_iter().map(Into::into));
        self
    }

    pub fn with_exclude<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(attributes.into_iter().map(Into::into));
        self
    }

    pub fn with_inline<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inline = attributes.into_iter().map(Into::into).collect();
        self
    }

    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn load_first(mut self) -> Self {
        self.load_first = true;
        self
    }

    pub fn with_reference_line(mut self, attribute: impl Into<String>) -> Self {
        self.reference_line = Some(attribute.into());
        self
    }

    pub fn with_default(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(attribute.into(), value.into());
        self
    }

    pub fn with_rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.insert(from.into(), to.into());
        self
    }

    pub fn with_rewrite(
        mut self,
        attribute: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        self.rewrites
            .entry(attribute.into())
            .or_default()
            .insert(from.into(), to.into());
        self
    }

    pub fn with_compound(mut self, base: impl Into<String>, rule: CompoundRule) -> Self {
        self.compounds.insert(base.into(), rule);
        self
    }

    pub fn with_reference(mut self, attribute: impl Into<String>, rule: ReferenceRule) -> Self {
        self.references.insert(attribute.into(), rule);
        self
    }

    pub fn without_compound_grouping(mut self) -> Self {
        self.compound_grouping = false;
        self
    }

    /// The canonical id attribute for this object type.
    pub fn id_attribute(&self) -> String {
        self.id_attribute
            .clone()
            .unwrap_or_else(|| default_id_attribute(&self.object_type))
    }

    /// Fully qualified MO path of an instance of this object type.
    pub fn path_for(&self, instance_id: &str) -> String {
        match self.parent.as_deref().filter(|parent| !parent.is_empty()) {
            Some(parent) => format!("{parent},{}={instance_id}", self.object_type),
            None => format!("{}={instance_id}", self.object_type),
        }
    }

    pub fn is_excluded(&self, attribute: &str) -> bool {
        self.exclude.contains(attribute)
    }

    pub fn is_mandatory(&self, attribute: &str) -> bool {
        self.mandatory.contains(attribute)
    }

    pub fn default_for(&self, attribute: &str) -> Option<&str> {
        self.defaults.get(attribute).map(String::as_str)
    }

    pub fn is_inline(&self, attribute: &str) -> bool {
        self.inline.iter().any(|name| name == attribute)
    }

    /// Whether rows of this base collapse into one compound value.
    pub fn groups_compound(&self, base: &str) -> bool {
        self.compound_grouping && !self.flat.contains(base)
    }

    pub fn compound_rule(&self, base: &str) -> Option<&CompoundRule> {
        self.compounds.get(base)
    }

    pub fn reference_rule(&self, attribute: &str) -> Option<&ReferenceRule> {
        self.references.get(attribute)
    }

    /// Apply the configured rewrite for `attribute`, if any.
    pub fn rewrite<'a>(&'a self, attribute: &str, value: &'a str) -> &'a str {
        self.rewrites
            .get(attribute)
            .and_then(|map| map.get(value))
            .map_or(value, String::as_str)
    }
}

/// `NRSectorCarrier` -> `nRSectorCarrierId`.
pub fn default_id_attribute(object_type: &str) -> String {
    let mut chars = object_type.chars();
    match chars.next() {
        Some(first) => format!("{}{}Id", first.to_lowercase(), chars.as_str()),
        None => "id".to_string(),
    }
}
