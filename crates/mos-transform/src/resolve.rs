//! Instance resolution.
//!
//! Resolution runs in two passes over the union of parsed instances. The
//! identity pass gives every instance an id and path and indexes them; the
//! attribute pass then groups compounds and links references against that
//! index. Resolving is pure: the same raw instance and index always produce
//! the same record.

use std::collections::{BTreeSet, HashMap};

use indexmap::IndexMap;
use tracing::{debug, warn};

use mos_model::{
    AttributeValue, Diagnostic, IdSource, InstanceRecord, RawInstance, Reference, Resolution,
    SourceColumn,
};
use mos_policy::{OrderingPolicy, PolicyCatalog, ReferenceRule, ReferenceSource, Settings};

use crate::compound::build_compound;

/// Identifier of an instance and the attributes that only carry identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub instance_id: String,
    pub id_source: IdSource,
    pub identity: BTreeSet<String>,
}

/// One resolved instance plus the warnings raised while resolving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub record: InstanceRecord,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
struct IndexEntry {
    path: String,
    attributes: IndexMap<String, String>,
}

/// Lookup of every identified instance by `(object type, instance id)`.
#[derive(Debug, Clone, Default)]
pub struct InstanceIndex {
    entries: HashMap<(String, String), IndexEntry>,
}

impl InstanceIndex {
    /// Register an instance. The first registration of a key wins; returns
    /// `false` for duplicates.
    pub fn insert(
        &mut self,
        object_type: &str,
        instance_id: &str,
        path: String,
        attributes: IndexMap<String, String>,
    ) -> bool {
        let key = (object_type.to_string(), instance_id.to_string());
        if self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, IndexEntry { path, attributes });
        true
    }

    fn entry(&self, object_type: &str, instance_id: &str) -> Option<&IndexEntry> {
        self.entries
            .get(&(object_type.to_string(), instance_id.to_string()))
    }

    pub fn path(&self, object_type: &str, instance_id: &str) -> Option<&str> {
        self.entry(object_type, instance_id)
            .map(|entry| entry.path.as_str())
    }

    pub fn attribute(&self, object_type: &str, instance_id: &str, attribute: &str) -> Option<&str> {
        self.entry(object_type, instance_id)
            .and_then(|entry| entry.attributes.get(attribute))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Every resolved record, in input order, with the collected warnings and
/// the object types that had no policy (with their instance counts).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSet {
    pub records: Vec<InstanceRecord>,
    pub diagnostics: Vec<Diagnostic>,
    pub gaps: IndexMap<String, usize>,
}

impl ResolvedSet {
    pub fn of_type<'a>(
        &'a self,
        object_type: &'a str,
    ) -> impl Iterator<Item = &'a InstanceRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| record.object_type == object_type)
    }
}

/// Resolves raw instances against a policy catalog.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    catalog: &'a PolicyCatalog,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a PolicyCatalog) -> Self {
        Self { catalog }
    }

    fn settings(&self) -> &Settings {
        &self.catalog.settings
    }

    /// Derive the identifier of a raw instance.
    ///
    /// The policy's id attribute wins, then the first identifier row, then
    /// the column header.
    pub fn identify(&self, raw: &RawInstance, policy: &OrderingPolicy) -> Identity {
        let attributes = renamed(raw, policy);
        self.identify_attributes(&attributes, &raw.source, raw.ordinal, policy)
    }

    fn identify_attributes(
        &self,
        attributes: &IndexMap<String, String>,
        source: &SourceColumn,
        ordinal: usize,
        policy: &OrderingPolicy,
    ) -> Identity {
        let settings = self.settings();
        let mut identity: BTreeSet<String> = attributes
            .keys()
            .filter(|name| settings.is_identifier_attribute(name))
            .cloned()
            .collect();

        let id_attribute = policy.id_attribute();
        if let Some(value) = attributes.get(&id_attribute) {
            identity.insert(id_attribute);
            return Identity {
                instance_id: value.clone(),
                id_source: IdSource::IdAttribute,
                identity,
            };
        }
        if let Some((_, value)) = attributes
            .iter()
            .find(|(name, _)| settings.is_identifier_attribute(name))
        {
            return Identity {
                instance_id: value.clone(),
                id_source: IdSource::IdentifierRow,
                identity,
            };
        }
        let instance_id = if ordinal == 0 {
            source.header.clone()
        } else {
            format!("{}-{}", source.header, ordinal + 1)
        };
        Identity {
            instance_id,
            id_source: IdSource::ColumnHeader,
            identity,
        }
    }

    /// Identity pass: index every instance that has a policy.
    pub fn index(&self, raws: &[RawInstance]) -> InstanceIndex {
        let mut index = InstanceIndex::default();
        for raw in raws {
            let Some(policy) = self.catalog.get(&raw.object_type) else {
                continue;
            };
            let attributes = renamed(raw, policy);
            let identity = self.identify_attributes(&attributes, &raw.source, raw.ordinal, policy);
            let path = policy.path_for(&identity.instance_id);
            if !index.insert(&raw.object_type, &identity.instance_id, path, attributes) {
                debug!(
                    object_type = %raw.object_type,
                    instance_id = %identity.instance_id,
                    source = %raw.source,
                    "duplicate instance id; first occurrence is referenced"
                );
            }
        }
        index
    }

    /// Attribute pass for one instance. `None` when the object type has no
    /// policy.
    pub fn resolve(&self, raw: &RawInstance, index: &InstanceIndex) -> Option<Resolved> {
        let policy = self.catalog.get(&raw.object_type)?;
        let settings = self.settings();
        let mut attributes = renamed(raw, policy);
        let identity = self.identify_attributes(&attributes, &raw.source, raw.ordinal, policy);
        let mut diagnostics = Vec::new();

        if identity.id_source == IdSource::ColumnHeader {
            warn!(
                object_type = %raw.object_type,
                column = %raw.source,
                fallback_id = %identity.instance_id,
                "no identifier; using column header"
            );
            diagnostics.push(Diagnostic::MissingIdentifier {
                object_type: raw.object_type.clone(),
                column: raw.source.to_string(),
                fallback_id: identity.instance_id.clone(),
            });
        }

        let mut references: IndexMap<String, Reference> = IndexMap::new();
        for (attribute, rule) in &policy.references {
            let Some(target_id) = reference_target(attribute, rule, &attributes, &raw.source) else {
                continue;
            };
            let reference = self.link(rule, &target_id, index);
            if reference.is_resolved() {
                borrow_attributes(rule, &target_id, index, &mut attributes);
            } else {
                warn!(
                    object_type = %raw.object_type,
                    instance_id = %identity.instance_id,
                    attribute = %attribute,
                    target_type = %rule.target,
                    target_id = %target_id,
                    "unresolved reference"
                );
                diagnostics.push(Diagnostic::UnresolvedReference {
                    object_type: raw.object_type.clone(),
                    instance_id: identity.instance_id.clone(),
                    attribute: attribute.clone(),
                    target_type: rule.target.clone(),
                    target_id,
                });
            }
            references.insert(attribute.clone(), reference);
        }

        let mut values: IndexMap<String, AttributeValue> = IndexMap::new();
        let mut compounds: IndexMap<String, Vec<(String, String)>> = IndexMap::new();
        for (name, value) in &attributes {
            if let Some(reference) = references.shift_remove(name) {
                values.insert(name.clone(), AttributeValue::Reference(reference));
                continue;
            }
            let value = scalar_value(settings, policy, name, value);
            let compound = settings
                .split_compound(name)
                .filter(|(base, _)| !identity.identity.contains(name) && policy.groups_compound(base));
            match compound {
                Some((base, sub_key)) => {
                    // Reserve the position of the first sub-row.
                    if !values.contains_key(base) {
                        values.insert(base.to_string(), AttributeValue::scalar(""));
                    }
                    compounds
                        .entry(base.to_string())
                        .or_default()
                        .push((sub_key.to_string(), value));
                }
                None => {
                    values.insert(name.clone(), AttributeValue::Scalar(value));
                }
            }
        }
        // Header-derived references exist even when the sheet has no row for them.
        for (name, reference) in references {
            values.insert(name, AttributeValue::Reference(reference));
        }
        for (base, pairs) in compounds {
            let rule = policy.compound_rule(&base).cloned().unwrap_or_default();
            let compound = build_compound(&base, pairs, &rule, policy.default_for(&base));
            values.insert(base, AttributeValue::Compound(compound));
        }

        let record = InstanceRecord {
            object_type: raw.object_type.clone(),
            path: policy.path_for(&identity.instance_id),
            instance_id: identity.instance_id,
            id_source: identity.id_source,
            source: raw.source.clone(),
            ordinal: raw.ordinal,
            attributes: values,
            identity: identity.identity,
        };
        Some(Resolved {
            record,
            diagnostics,
        })
    }

    fn link(&self, rule: &ReferenceRule, target_id: &str, index: &InstanceIndex) -> Reference {
        let resolution = if rule.strict {
            match index.path(&rule.target, target_id) {
                Some(path) => Resolution::Resolved(path.to_string()),
                None => Resolution::Unresolved(self.settings().unknown(target_id)),
            }
        } else {
            let path = match self.catalog.get(&rule.target) {
                Some(target) => target.path_for(target_id),
                None => format!("{}={target_id}", rule.target),
            };
            Resolution::Resolved(path)
        };
        Reference {
            target_type: rule.target.clone(),
            target_id: target_id.to_string(),
            resolution,
        }
    }
}

/// Resolve every instance: identity pass, then attribute pass.
pub fn resolve_all(raws: &[RawInstance], catalog: &PolicyCatalog) -> ResolvedSet {
    let resolver = Resolver::new(catalog);
    let index = resolver.index(raws);
    debug!(instances = index.len(), "indexed instances");

    let mut set = ResolvedSet::default();
    for raw in raws {
        match resolver.resolve(raw, &index) {
            Some(resolved) => {
                set.records.push(resolved.record);
                set.diagnostics.extend(resolved.diagnostics);
            }
            None => *set.gaps.entry(raw.object_type.clone()).or_insert(0) += 1,
        }
    }
    set
}

fn renamed(raw: &RawInstance, policy: &OrderingPolicy) -> IndexMap<String, String> {
    raw.attributes
        .iter()
        .map(|(name, value)| {
            let name = policy.renames.get(name).unwrap_or(name);
            (name.clone(), value.clone())
        })
        .collect()
}

fn scalar_value(settings: &Settings, policy: &OrderingPolicy, name: &str, value: &str) -> String {
    let value = if settings.lowercase_booleans
        && (value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false"))
    {
        value.to_ascii_lowercase()
    } else {
        value.to_string()
    };
    policy.rewrite(name, &value).to_string()
}

/// Instance id named by a reference: the attribute value (last `Type=id`
/// segment of a path) or the pattern match on the column header. Header
/// references fall back to the whole header when the pattern does not match.
fn reference_target(
    attribute: &str,
    rule: &ReferenceRule,
    attributes: &IndexMap<String, String>,
    source: &SourceColumn,
) -> Option<String> {
    match rule.source {
        ReferenceSource::ById => attributes.get(attribute).map(|value| id_from_value(value)),
        ReferenceSource::FromHeader => {
            let extracted = rule
                .pattern
                .as_ref()
                .and_then(|pattern| pattern.extract(&source.header));
            Some(extracted.unwrap_or(&source.header).to_string())
        }
    }
}

fn id_from_value(value: &str) -> String {
    let last = value.rsplit(',').next().unwrap_or(value);
    match last.split_once('=') {
        Some((_, id)) => id.trim().to_string(),
        None => last.trim().to_string(),
    }
}

fn borrow_attributes(
    rule: &ReferenceRule,
    target_id: &str,
    index: &InstanceIndex,
    attributes: &mut IndexMap<String, String>,
) {
    for name in &rule.borrow {
        if attributes.contains_key(name) {
            continue;
        }
        if let Some(value) = index.attribute(&rule.target, target_id, name) {
            attributes.insert(name.clone(), value.to_string());
        }
    }
}
