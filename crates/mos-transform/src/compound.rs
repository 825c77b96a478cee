//! Compound attribute assembly: sub-key ordering and repeated groups.

use std::cmp::Ordering;

use mos_model::CompoundAttribute;
use mos_policy::{CompoundRule, CompoundSort};

/// Split a sub-key into its text prefix and trailing number (`SIB10` ->
/// `("SIB", Some(10))`).
pub fn numeric_suffix(sub_key: &str) -> (&str, Option<u64>) {
    let prefix = sub_key.trim_end_matches(|c: char| c.is_ascii_digit());
    let digits = &sub_key[prefix.len()..];
    (prefix, digits.parse().ok())
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (a_prefix, a_number) = numeric_suffix(a);
    let (b_prefix, b_number) = numeric_suffix(b);
    a_prefix
        .cmp(b_prefix)
        .then(a_number.cmp(&b_number))
        .then_with(|| a.cmp(b))
}

/// Rank of a sub-key in a fixed order: exact entry first, then the first
/// entry it starts with, else after every listed entry.
fn fixed_rank(order: &[String], sub_key: &str) -> usize {
    order
        .iter()
        .position(|entry| entry == sub_key)
        .or_else(|| {
            order
                .iter()
                .position(|entry| sub_key.starts_with(entry.as_str()))
        })
        .unwrap_or(order.len())
}

/// Order sub-key/value pairs according to the rule. The sort is stable.
pub fn sort_pairs(pairs: &mut [(String, String)], rule: &CompoundRule) {
    match rule.sort {
        CompoundSort::Source => {}
        CompoundSort::Lexical => pairs.sort_by(|a, b| a.0.cmp(&b.0)),
        CompoundSort::Natural => pairs.sort_by(|a, b| natural_cmp(&a.0, &b.0)),
        CompoundSort::Fixed => pairs.sort_by(|a, b| {
            fixed_rank(&rule.order, &a.0)
                .cmp(&fixed_rank(&rule.order, &b.0))
                .then_with(|| a.0.cmp(&b.0))
        }),
    }
}

fn split_list<'a>(value: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.trim().is_empty() {
        value.split_whitespace().collect()
    } else {
        value
            .split(separator)
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect()
    }
}

/// Zip per-sub-key value lists into repeated groups. `None` when the lists
/// are empty or their lengths differ.
fn zip_groups(pairs: &[(String, String)], separator: &str) -> Option<Vec<Vec<(String, String)>>> {
    let lists: Vec<(&str, Vec<&str>)> = pairs
        .iter()
        .map(|(key, value)| (key.as_str(), split_list(value, separator)))
        .collect();
    let len = lists.first()?.1.len();
    if len == 0 || lists.iter().any(|(_, items)| items.len() != len) {
        return None;
    }
    Some(
        (0..len)
            .map(|i| {
                lists
                    .iter()
                    .map(|(key, items)| ((*key).to_string(), items[i].to_string()))
                    .collect()
            })
            .collect(),
    )
}

/// Collapse the pairs collected for `base` into one compound value.
///
/// `fallback` is the policy default for the base; it replaces repeated groups
/// whose vertex lists cannot be zipped.
pub fn build_compound(
    base: &str,
    mut pairs: Vec<(String, String)>,
    rule: &CompoundRule,
    fallback: Option<&str>,
) -> CompoundAttribute {
    sort_pairs(&mut pairs, rule);
    let groups = match rule.repeat_separator.as_deref() {
        Some(separator) => match zip_groups(&pairs, separator) {
            Some(groups) => groups,
            None => match fallback {
                Some(default) => {
                    tracing::debug!(base, "vertex lists do not line up; using default");
                    CompoundAttribute::parse(default, &rule.group_joiner)
                }
                None => vec![pairs],
            },
        },
        None => vec![pairs],
    };
    CompoundAttribute {
        base: base.to_string(),
        groups,
        typed: rule.typed,
        per_sub_key: rule.per_sub_key,
        group_joiner: rule.group_joiner.clone(),
    }
}
