//! Ordering and defaulting.
//!
//! Projection walks the policy's declared order first, then appends the
//! remaining attributes in lexical order unless the policy is closed.

use std::collections::HashSet;

use serde::Serialize;

use mos_model::{AttributeValue, InstanceRecord};
use mos_policy::OrderingPolicy;

/// Why an attribute appears in the projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Matched an entry of the declared order.
    Ordered,
    /// Filled from the policy's defaulting map.
    Default,
    /// Absent but mandatory; emitted with an empty value.
    Mandatory,
    /// Not named by the declared order.
    Tail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedAttribute {
    pub name: String,
    pub value: AttributeValue,
    pub origin: Origin,
}

impl ProjectedAttribute {
    fn new(name: &str, value: AttributeValue, origin: Origin) -> Self {
        Self {
            name: name.to_string(),
            value,
            origin,
        }
    }
}

/// Project an instance through its policy into the ordered attribute list to
/// emit.
pub fn project(instance: &InstanceRecord, policy: &OrderingPolicy) -> Vec<ProjectedAttribute> {
    let emittable = |name: &str| !policy.is_excluded(name) && !instance.is_identity(name);
    let mut consumed: HashSet<&str> = HashSet::new();
    let mut projected = Vec::new();

    for entry in &policy.order {
        if !emittable(entry.as_str()) {
            continue;
        }
        let matched = match instance.attributes.get_key_value(entry.as_str()) {
            Some((name, value)) if !consumed.contains(name.as_str()) => Some((name, value)),
            _ => instance.attributes.iter().find(|(name, _)| {
                name.starts_with(entry.as_str())
                    && !consumed.contains(name.as_str())
                    && emittable(name.as_str())
            }),
        };

        match matched {
            Some((name, value)) => {
                consumed.insert(name.as_str());
                if !value.is_empty() {
                    projected.push(ProjectedAttribute::new(name, value.clone(), Origin::Ordered));
                } else if let Some(default) = policy.default_for(name) {
                    projected.push(ProjectedAttribute::new(
                        name,
                        AttributeValue::scalar(default),
                        Origin::Default,
                    ));
                } else if policy.is_mandatory(name) {
                    projected.push(ProjectedAttribute::new(
                        name,
                        AttributeValue::scalar(""),
                        Origin::Mandatory,
                    ));
                }
            }
            None if consumed.contains(entry.as_str()) => {}
            None => {
                consumed.insert(entry.as_str());
                if let Some(default) = policy.default_for(entry) {
                    projected.push(ProjectedAttribute::new(
                        entry,
                        AttributeValue::scalar(default),
                        Origin::Default,
                    ));
                } else if policy.is_mandatory(entry) {
                    projected.push(ProjectedAttribute::new(
                        entry,
                        AttributeValue::scalar(""),
                        Origin::Mandatory,
                    ));
                }
            }
        }
    }

    if policy.closed {
        return projected;
    }

    let mut tail: Vec<(&String, &AttributeValue)> = instance
        .attributes
        .iter()
        .filter(|(name, value)| {
            !consumed.contains(name.as_str()) && emittable(name.as_str()) && !value.is_empty()
        })
        .collect();
    tail.sort_by(|a, b| a.0.cmp(b.0));
    projected.extend(
        tail.into_iter()
            .map(|(name, value)| ProjectedAttribute::new(name, value.clone(), Origin::Tail)),
    );
    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use indexmap::IndexMap;
    use mos_model::{IdSource, SourceColumn};

    fn record(attributes: &[(&str, &str)]) -> InstanceRecord {
        let attributes: IndexMap<String, AttributeValue> = attributes
            .iter()
            .map(|(k, v)| (k.to_string(), AttributeValue::scalar(*v)))
            .collect();
        let identity: BTreeSet<String> = attributes
            .keys()
            .filter(|name| name.ends_with('='))
            .cloned()
            .collect();
        InstanceRecord {
            object_type: "Widget".to_string(),
            instance_id: "W1".to_string(),
            id_source: IdSource::IdentifierRow,
            path: "Widget=W1".to_string(),
            source: SourceColumn {
                table: "Sheet1".to_string(),
                index: 2,
                header: "C".to_string(),
            },
            ordinal: 0,
            attributes,
            identity,
        }
    }

    fn lines(projected: &[ProjectedAttribute]) -> Vec<String> {
        projected
            .iter()
            .map(|attr| format!("{} {}", attr.name, attr.value.render()))
            .collect()
    }

    #[test]
    fn mandatory_absent_attribute_is_emitted_empty() {
        let policy = OrderingPolicy::new("Widget")
            .with_order(["color", "size"])
            .with_mandatory(["size"]);
        let projected = project(&record(&[("color", "red")]), &policy);
        assert_eq!(lines(&projected), vec!["color red", "size "]);
        assert_eq!(projected[1].origin, Origin::Mandatory);
    }

    #[test]
    fn absent_optional_attribute_is_skipped() {
        let policy = OrderingPolicy::new("Widget").with_order(["color", "size"]);
        let projected = project(&record(&[("color", "red")]), &policy);
        assert_eq!(lines(&projected), vec!["color red"]);
    }

    #[test]
    fn defaults_fill_absent_attributes() {
        let policy = OrderingPolicy::new("Widget")
            .with_order(["color", "size"])
            .with_mandatory(["size"])
            .with_default("size", "M");
        let projected = project(&record(&[("color", "red")]), &policy);
        assert_eq!(lines(&projected), vec!["color red", "size M"]);
        assert_eq!(projected[1].origin, Origin::Default);
    }

    #[test]
    fn prefix_entries_match_first_unconsumed_key() {
        let policy = OrderingPolicy::new("Widget").with_order(["sibType", "sibType", "color"]);
        let projected = project(
            &record(&[("color", "red"), ("sibType4", "a"), ("sibType2", "b")]),
            &policy,
        );
        assert_eq!(lines(&projected), vec!["sibType4 a", "sibType2 b", "color red"]);
    }

    #[test]
    fn tail_is_lexical_and_skips_excluded_and_identity() {
        let policy = OrderingPolicy::new("Widget")
            .with_order(["color"])
            .with_exclude(["secret"]);
        let projected = project(
            &record(&[
                ("Widget=", "W1"),
                ("zeta", "1"),
                ("secret", "x"),
                ("alpha", "2"),
                ("color", "red"),
            ]),
            &policy,
        );
        assert_eq!(lines(&projected), vec!["color red", "alpha 2", "zeta 1"]);
        assert!(projected[1..].iter().all(|attr| attr.origin == Origin::Tail));
    }

    #[test]
    fn excluded_entries_are_never_emitted_even_when_listed() {
        let policy = OrderingPolicy::new("Widget")
            .with_order(["secret", "color"])
            .with_mandatory(["secret"])
            .with_exclude(["secret"]);
        let projected = project(&record(&[("secret", "x"), ("color", "red")]), &policy);
        assert_eq!(lines(&projected), vec!["color red"]);
    }

    #[test]
    fn closed_policy_drops_tail() {
        let policy = OrderingPolicy::new("Widget").with_order(["color"]).closed();
        let projected = project(&record(&[("color", "red"), ("extra", "1")]), &policy);
        assert_eq!(lines(&projected), vec!["color red"]);
    }
}
