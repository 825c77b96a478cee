//! The one-way pipeline: normalize, parse, resolve, project, emit, assemble.
//!
//! Every stage is synchronous and works on data owned by this call; nothing
//! here touches the file system.

use serde::Serialize;
use tracing::{debug, info, info_span, warn};

use mos_model::{AttributeTable, Diagnostic, Diagnostics, EmissionMode};
use mos_policy::PolicyCatalog;
use mos_report::{Section, assemble, emit};
use mos_transform::{ResolvedSet, parse_tables, project, resolve_all};

use crate::options::CompileOptions;

/// What one section of the document holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionSummary {
    pub object_type: String,
    pub mode: EmissionMode,
    pub instances: usize,
    /// Command lines across all blocks, annotations included.
    pub lines: usize,
}

/// Result of one compilation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compilation {
    pub document: String,
    pub sections: Vec<SectionSummary>,
    pub diagnostics: Diagnostics,
}

impl Compilation {
    pub fn instance_count(&self) -> usize {
        self.sections.iter().map(|section| section.instances).sum()
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.error_count() > 0
    }
}

/// Compile attribute tables into one configuration script.
///
/// Malformed tables are skipped with a diagnostic; the remaining tables are
/// compiled as one union. Object types without a policy are reported and
/// left out of the document.
pub fn compile(
    tables: &[AttributeTable],
    catalog: &PolicyCatalog,
    options: &CompileOptions,
) -> Compilation {
    let mut diagnostics = Diagnostics::new();

    let parsed = info_span!("parse", tables = tables.len())
        .in_scope(|| parse_tables(tables, &catalog.settings));
    diagnostics.extend(parsed.diagnostics);

    let resolved = info_span!("resolve", instances = parsed.instances.len())
        .in_scope(|| resolve_all(&parsed.instances, catalog));
    diagnostics.extend(resolved.diagnostics.iter().cloned());
    for (object_type, instances) in &resolved.gaps {
        warn!(object_type = %object_type, instances, "no policy for object type; instances skipped");
        diagnostics.push(Diagnostic::PolicyGap {
            object_type: object_type.clone(),
            instances: *instances,
        });
    }

    let sections = info_span!("emit").in_scope(|| build_sections(&resolved, catalog, options));
    let summaries = sections
        .iter()
        .map(|section| SectionSummary {
            object_type: section.object_type.clone(),
            mode: catalog
                .get(&section.object_type)
                .map(|policy| policy.mode)
                .unwrap_or_default(),
            instances: section.blocks.len(),
            lines: section.blocks.iter().map(|block| block.lines.len()).sum(),
        })
        .collect::<Vec<_>>();

    let document = info_span!("assemble").in_scope(|| {
        assemble(
            &options.header(),
            diagnostics.as_slice(),
            &sections,
            &catalog.script,
        )
    });

    info!(
        sections = summaries.len(),
        instances = summaries.iter().map(|s| s.instances).sum::<usize>(),
        errors = diagnostics.error_count(),
        warnings = diagnostics.warning_count(),
        "compiled script"
    );
    Compilation {
        document,
        sections: summaries,
        diagnostics,
    }
}

fn build_sections(
    resolved: &ResolvedSet,
    catalog: &PolicyCatalog,
    options: &CompileOptions,
) -> Vec<Section> {
    let mut sections = Vec::new();
    for policy in catalog.policies() {
        let blocks: Vec<_> = resolved
            .of_type(&policy.object_type)
            .map(|record| emit(record, policy, &project(record, policy), &catalog.script))
            .collect();
        if blocks.is_empty() && !options.include_empty_sections {
            debug!(object_type = %policy.object_type, "no instances; section omitted");
            continue;
        }
        sections.push(Section {
            object_type: policy.object_type.clone(),
            parent: policy.parent.clone(),
            blocks,
        });
    }
    sections
}
