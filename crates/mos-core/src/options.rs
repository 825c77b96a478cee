use chrono::NaiveDate;

use mos_report::ScriptHeader;

/// Per-run knobs that are not part of the policy catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileOptions {
    pub site: Option<String>,
    pub date: Option<NaiveDate>,
    /// Emit a section for every catalog entry, even with no instances.
    pub include_empty_sections: bool,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_empty_sections(mut self) -> Self {
        self.include_empty_sections = true;
        self
    }

    pub fn header(&self) -> ScriptHeader {
        ScriptHeader {
            site: self.site.clone(),
            date: self.date,
        }
    }
}
