//! Command emitter.
//!
//! Turns one projected instance into a [`CommandBlock`]. The block shape is
//! chosen by the policy's emission mode only; nothing about the instance
//! itself changes which commands appear.

use tracing::trace;

use mos_model::{AttributeValue, CommandBlock, EmissionMode, InstanceRecord};
use mos_policy::{OrderingPolicy, ScriptSettings};
use mos_transform::ProjectedAttribute;

/// Keywords of the target command syntax.
pub mod keyword {
    pub const CREATE: &str = "cr";
    pub const CREATE_NAMED: &str = "crn";
    pub const END: &str = "end";
    pub const SET: &str = "set";
    pub const LOAD: &str = "ld";
}

/// One attribute rendered as `(name, value)` fragments. Per-sub-key compounds
/// yield one fragment per pair; everything else yields exactly one.
fn fragments(attribute: &ProjectedAttribute) -> Vec<(&str, String)> {
    match &attribute.value {
        AttributeValue::Compound(compound) if compound.per_sub_key => compound
            .pair_fragments()
            .into_iter()
            .map(|fragment| (attribute.name.as_str(), fragment))
            .collect(),
        value => vec![(attribute.name.as_str(), value.render())],
    }
}

/// Split off the reference-line attribute so it can follow the path header.
fn split_reference<'a>(
    projected: &'a [ProjectedAttribute],
    policy: &OrderingPolicy,
) -> (Option<&'a ProjectedAttribute>, Vec<&'a ProjectedAttribute>) {
    let Some(reference) = policy.reference_line.as_deref() else {
        return (None, projected.iter().collect());
    };
    let mut pulled = None;
    let mut rest = Vec::with_capacity(projected.len());
    for attribute in projected {
        if pulled.is_none() && attribute.name == reference {
            pulled = Some(attribute);
        } else {
            rest.push(attribute);
        }
    }
    (pulled, rest)
}

fn labelled(attribute: &ProjectedAttribute, lines: &mut Vec<String>) {
    for (name, value) in fragments(attribute) {
        lines.push(format!("{name} {value}"));
    }
}

fn positional(attribute: &ProjectedAttribute, lines: &mut Vec<String>) {
    for (_, value) in fragments(attribute) {
        lines.push(value);
    }
}

fn set_lines(path: &str, attribute: &ProjectedAttribute, lines: &mut Vec<String>) {
    for (name, value) in fragments(attribute) {
        lines.push(format!("{} {path} {name} {value}", keyword::SET));
    }
}

/// Emit the command block for one instance.
///
/// `projected` is the output of [`mos_transform::project`] for the same
/// instance and policy.
pub fn emit(
    instance: &InstanceRecord,
    policy: &OrderingPolicy,
    projected: &[ProjectedAttribute],
    script: &ScriptSettings,
) -> CommandBlock {
    let path = instance.path.as_str();
    let mode = policy.mode;
    let (reference, rest) = split_reference(projected, policy);
    let mut lines = Vec::new();

    if script.annotate_blocks {
        lines.push(script.comment(&format!("{path} ({})", instance.source)));
    }
    if policy.load_first && mode != EmissionMode::SetOnly {
        lines.push(format!("{} {path}", keyword::LOAD));
    }

    match mode {
        EmissionMode::CreateMinimal => {
            lines.push(format!("{} {path}", keyword::CREATE));
            for attribute in reference.into_iter().chain(rest) {
                positional(attribute, &mut lines);
            }
        }
        EmissionMode::CreateWithAttrs => {
            lines.push(format!("{} {path}", keyword::CREATE_NAMED));
            for attribute in reference.into_iter().chain(rest) {
                labelled(attribute, &mut lines);
            }
            lines.push(keyword::END.to_string());
        }
        EmissionMode::CreateNamedBlock => {
            let (inline, deferred): (Vec<_>, Vec<_>) = rest
                .into_iter()
                .partition(|attribute| policy.is_inline(&attribute.name));
            lines.push(format!("{} {path}", keyword::CREATE_NAMED));
            for attribute in reference.into_iter().chain(inline) {
                labelled(attribute, &mut lines);
            }
            lines.push(keyword::END.to_string());
            for attribute in deferred {
                set_lines(path, attribute, &mut lines);
            }
        }
        EmissionMode::SetOnly => {
            for attribute in reference.into_iter().chain(rest) {
                set_lines(path, attribute, &mut lines);
            }
        }
    }

    trace!(path, mode = %mode, lines = lines.len(), "emitted block");
    CommandBlock {
        mode,
        object_type: instance.object_type.clone(),
        instance_id: instance.instance_id.clone(),
        path: instance.path.clone(),
        lines,
    }
}
