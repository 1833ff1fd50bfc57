//! Rule registration and effective rule descriptors.

use crate::config::Config;
use crate::metadata::RuleMetadata;
use crate::node::NodeKind;
use crate::rule::{RuleBinding, RuleShape};
use crate::types::{Category, DocumentKinds, Impact, MergeState, Severity};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

/// Registration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Two rules share an id.
    #[error("duplicate rule id {id}")]
    DuplicateId {
        /// The repeated id.
        id: String,
    },
}

/// Effective metadata of a registered rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDescriptor {
    /// Rule id.
    pub id: &'static str,
    /// Rule name.
    pub name: &'static str,
    /// What the rule checks.
    pub description: &'static str,
    /// Capability the rule was bound with.
    pub shape: RuleShape,
    /// Node variant the rule targets.
    pub target: NodeKind,
    /// Member name filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<&'static str>,
    /// Document kinds the rule applies to.
    pub document_kinds: DocumentKinds,
    /// Pass the rule runs in.
    pub merge_state: MergeState,
    /// Severity of its diagnostics.
    pub severity: Severity,
    /// Category of its diagnostics.
    pub category: Category,
    /// Consumer impact.
    pub impact: Impact,
    /// Message template.
    pub message_template: &'static str,
}

impl RuleDescriptor {
    /// Descriptor with the rule's compiled-in defaults.
    #[must_use]
    pub fn from_binding(binding: &RuleBinding) -> Self {
        let rule = binding.rule();
        Self {
            id: rule.id(),
            name: rule.name(),
            description: rule.description(),
            shape: binding.shape(),
            target: binding.target(),
            key: binding.key(),
            document_kinds: rule.document_kinds(),
            merge_state: rule.merge_state(),
            severity: rule.default_severity(),
            category: rule.default_category(),
            impact: rule.impact(),
            message_template: rule.message_template(),
        }
    }

    /// Applies metadata overrides on top of the current values.
    pub fn apply_metadata(&mut self, metadata: &RuleMetadata) {
        if let Some(severity) = metadata.severity {
            self.severity = severity;
        }
        if let Some(category) = metadata.category {
            self.category = category;
        }
        if let Some(kinds) = metadata.document_kinds {
            self.document_kinds = kinds;
        }
        if let Some(state) = metadata.merge_state {
            self.merge_state = state;
        }
        if let Some(impact) = metadata.impact {
            self.impact = impact;
        }
    }

    /// True if the rule runs in a pass of `state` over documents of `kinds`.
    #[must_use]
    pub fn applies_to(&self, state: MergeState, kinds: DocumentKinds) -> bool {
        self.merge_state == state && self.document_kinds.intersects(kinds)
    }
}

/// A rule ready for dispatch.
#[derive(Debug)]
pub struct RegisteredRule {
    pub(crate) descriptor: RuleDescriptor,
    pub(crate) binding: RuleBinding,
}

impl RegisteredRule {
    /// Effective metadata.
    #[must_use]
    pub fn descriptor(&self) -> &RuleDescriptor {
        &self.descriptor
    }
}

/// Rules in registration order.
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: Vec<RegisteredRule>,
    ids: HashSet<&'static str>,
}

impl RuleRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a rule with its compiled-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateId`] if the id is taken.
    pub fn register(&mut self, binding: RuleBinding) -> Result<(), RegistryError> {
        let descriptor = RuleDescriptor::from_binding(&binding);
        if !self.ids.insert(descriptor.id) {
            return Err(RegistryError::DuplicateId {
                id: descriptor.id.to_string(),
            });
        }
        debug!("Registered {} ({}) on {}", descriptor.id, descriptor.name, descriptor.target);
        self.rules.push(RegisteredRule { descriptor, binding });
        Ok(())
    }

    /// Applies metadata to every rule.
    pub fn apply_metadata(&mut self, lookup: impl Fn(&str) -> RuleMetadata) {
        for rule in &mut self.rules {
            let metadata = lookup(rule.descriptor.id);
            rule.descriptor.apply_metadata(&metadata);
        }
    }

    /// Applies local configuration: drops disabled rules and overrides
    /// severities.
    pub fn apply_config(&mut self, config: &Config) {
        self.rules.retain(|rule| {
            let enabled = config.is_rule_enabled(rule.descriptor.id, rule.descriptor.name);
            if !enabled {
                debug!("Skipping disabled rule: {}", rule.descriptor.id);
            }
            enabled
        });
        self.ids = self.rules.iter().map(|r| r.descriptor.id).collect();

        for rule in &mut self.rules {
            if let Some(severity) = config.rule_severity(rule.descriptor.id, rule.descriptor.name) {
                rule.descriptor.severity = severity;
            }
        }
    }

    /// Keeps only the rules whose id or name is listed.
    pub fn retain_only(&mut self, selection: &[String]) {
        self.rules.retain(|rule| {
            selection
                .iter()
                .any(|s| s == rule.descriptor.id || s == rule.descriptor.name)
        });
        self.ids = self.rules.iter().map(|r| r.descriptor.id).collect();
    }

    /// Registered rules, in registration order.
    pub fn rules(&self) -> impl Iterator<Item = &RegisteredRule> {
        self.rules.iter()
    }

    /// Effective descriptors, in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &RuleDescriptor> {
        self.rules.iter().map(|r| &r.descriptor)
    }

    /// Descriptor for `id`.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RuleDescriptor> {
        self.descriptors().find(|d| d.id == id)
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if no rule is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
