use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PolicyError, Result};
use crate::policy::{OrderingPolicy, ReferenceSource};
use crate::settings::{ScriptSettings, Settings};

const BUNDLED_CATALOG: &str = include_str!("../policies/default.toml");

/// The full configuration surface of a compilation: global settings, script
/// framing and one policy per object type. Policy order is section order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyCatalog {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub script: ScriptSettings,
    #[serde(default, rename = "policy")]
    policies: Vec<OrderingPolicy>,
}

impl PolicyCatalog {
    pub fn new(
        settings: Settings,
        script: ScriptSettings,
        policies: Vec<OrderingPolicy>,
    ) -> Result<Self> {
        let catalog = Self {
            settings,
            script,
            policies,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Catalog with default settings and the given policies, in order.
    pub fn from_policies(policies: Vec<OrderingPolicy>) -> Result<Self> {
        Self::new(Settings::default(), ScriptSettings::default(), policies)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Self::parse(text, "<inline>")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PolicyError::io(path, e))?;
        let catalog = Self::parse(&text, &path.display().to_string())?;
        tracing::debug!(
            path = %path.display(),
            policies = catalog.policies.len(),
            "loaded policy catalog"
        );
        Ok(catalog)
    }

    /// The catalog shipped with the crate.
    pub fn bundled() -> Result<Self> {
        Self::parse(BUNDLED_CATALOG, "bundled default.toml")
    }

    fn parse(text: &str, origin: &str) -> Result<Self> {
        let catalog: Self = toml::from_str(text).map_err(|source| PolicyError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn validate(&self) -> Result<()> {
        if self.settings.compound_delimiter == self.settings.identifier_delimiter
            && !self.settings.compound_delimiter.is_empty()
        {
            return Err(PolicyError::InvalidSettings {
                message: format!(
                    "compound and identifier delimiters are both '{}'",
                    self.settings.compound_delimiter
                ),
            });
        }
        let mut seen = BTreeSet::new();
        for (index, policy) in self.policies.iter().enumerate() {
            if policy.object_type.trim().is_empty() {
                return Err(PolicyError::BlankObjectType { index });
            }
            if !seen.insert(policy.object_type.as_str()) {
                return Err(PolicyError::DuplicateObjectType {
                    object_type: policy.object_type.clone(),
                });
            }
            for (attribute, rule) in &policy.references {
                if rule.target.trim().is_empty() {
                    return Err(PolicyError::BlankTarget {
                        object_type: policy.object_type.clone(),
                        attribute: attribute.clone(),
                    });
                }
                if rule.source == ReferenceSource::FromHeader && rule.pattern.is_none() {
                    return Err(PolicyError::MissingPattern {
                        object_type: policy.object_type.clone(),
                        attribute: attribute.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, object_type: &str) -> Option<&OrderingPolicy> {
        self.policies
            .iter()
            .find(|policy| policy.object_type == object_type)
    }

    /// Section index of an object type.
    pub fn position(&self, object_type: &str) -> Option<usize> {
        self.policies
            .iter()
            .position(|policy| policy.object_type == object_type)
    }

    pub fn policies(&self) -> &[OrderingPolicy] {
        &self.policies
    }

    pub fn object_types(&self) -> impl Iterator<Item = &str> {
        self.policies.iter().map(|policy| policy.object_type.as_str())
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Add or replace the policy for its object type. Replacement keeps the
    /// original section position.
    pub fn insert(&mut self, policy: OrderingPolicy) {
        match self.position(&policy.object_type) {
            Some(index) => self.policies[index] = policy,
            None => self.policies.push(policy),
        }
    }

    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
