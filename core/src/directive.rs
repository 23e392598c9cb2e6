//! Composition directives: the recipe a command uses to shape its options.
//!
//! A [`CompositionDirective`] is built once, when a command is defined, and
//! reused by every invocation. It lists scalar fields to drop, how
//! associations are expanded, and options to remove or add after
//! derivation.
//!
//! # Example
//!
//! ```
//! use resource_command_core::*;
//!
//! let directive = CompositionDirective::builder()
//!     .without(["smart_variable_id"])
//!     .expand(|e| e.except(["smart_variables"]).including(["puppetclasses"]))
//!     .option(OptionSpec::new("value", ValueKind::String))
//!     .build()
//!     .unwrap();
//!
//! assert!(directive.excludes_scalar("smart_variable_id"));
//! assert!(!directive.expand.expands("smart_variables"));
//! assert!(directive.expand.expands("puppetclasses"));
//! ```

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::CompositionError;
use crate::types::OptionSpec;

/// Default expansion behavior for associations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ExpandMode {
    /// Every association is expanded unless excepted.
    #[default]
    All,
    /// Associations only contribute their foreign key unless force-included.
    None,
}

/// Association expansion settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExpandDirective {
    pub mode: ExpandMode,
    /// Associations left out entirely
    pub except: BTreeSet<String>,
    /// Associations always expanded, even if excepted
    pub including: BTreeSet<String>,
}

impl ExpandDirective {
    /// Leaves the named associations out.
    pub fn except<I, S>(mut self, associations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.except.extend(associations.into_iter().map(Into::into));
        self
    }

    /// Forces expansion of the named associations.
    pub fn including<I, S>(mut self, associations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.including.extend(associations.into_iter().map(Into::into));
        self
    }

    /// Stops expanding associations by default.
    pub fn none(mut self) -> Self {
        self.mode = ExpandMode::None;
        self
    }

    /// Returns `true` if the association is left out entirely.
    pub fn omits(&self, association: &str) -> bool {
        self.except.contains(association) && !self.including.contains(association)
    }

    /// Returns `true` if the association's searchable fields become options.
    pub fn expands(&self, association: &str) -> bool {
        if self.including.contains(association) {
            return true;
        }
        self.mode == ExpandMode::All && !self.except.contains(association)
    }

    /// All association names the directive mentions.
    pub fn referenced(&self) -> impl Iterator<Item = &str> {
        self.except
            .iter()
            .chain(self.including.iter())
            .map(String::as_str)
    }
}

/// Declarative recipe for deriving a command's options.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompositionDirective {
    /// Scalar fields dropped from the derived options
    pub excluded_scalars: BTreeSet<String>,
    /// Association expansion settings
    pub expand: ExpandDirective,
    /// Options appended after derivation, in declaration order
    pub extra_options: Vec<OptionSpec>,
    /// Options removed from the derived set before extras are appended
    pub removed_options: BTreeSet<String>,
}

impl CompositionDirective {
    /// Returns a new [`DirectiveBuilder`].
    pub fn builder() -> DirectiveBuilder {
        DirectiveBuilder::default()
    }

    /// Returns `true` if the scalar field is excluded.
    pub fn excludes_scalar(&self, name: &str) -> bool {
        self.excluded_scalars.contains(name)
    }
}

/// Builder for [`CompositionDirective`].
///
/// Each call only touches the directive under construction; [`build`]
/// validates and freezes it.
///
/// [`build`]: DirectiveBuilder::build
#[derive(Debug, Default)]
pub struct DirectiveBuilder {
    directive: CompositionDirective,
}

impl DirectiveBuilder {
    /// Drops scalar fields from the derived options.
    pub fn without<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directive
            .excluded_scalars
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Adjusts association expansion.
    pub fn expand(mut self, configure: impl FnOnce(ExpandDirective) -> ExpandDirective) -> Self {
        let current = std::mem::take(&mut self.directive.expand);
        self.directive.expand = configure(current);
        self
    }

    /// Adds an option, or redefines a derived option with the same name.
    pub fn option(mut self, option: OptionSpec) -> Self {
        self.directive.extra_options.push(option);
        self
    }

    /// Removes a derived option by name.
    pub fn remove_option(mut self, name: &str) -> Self {
        self.directive.removed_options.insert(name.to_string());
        self
    }

    /// Freezes the directive.
    ///
    /// Added options sharing a name collapse to the last declaration.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::ConflictingOption`] if two added options
    /// share a name but declare different value kinds.
    pub fn build(self) -> Result<CompositionDirective, CompositionError> {
        let mut directive = self.directive;
        let mut kinds: HashMap<&str, &'static str> = HashMap::new();

        for option in &directive.extra_options {
            let kind = option.kind.label();
            if let Some(first) = kinds.insert(option.name.as_str(), kind) {
                if first != kind {
                    return Err(CompositionError::ConflictingOption {
                        name: option.name.clone(),
                        first,
                        second: kind,
                    });
                }
            }
        }

        let mut extras: Vec<OptionSpec> = Vec::with_capacity(directive.extra_options.len());
        for option in directive.extra_options {
            extras.retain(|existing| existing.name != option.name);
            extras.push(option);
        }
        directive.extra_options = extras;

        Ok(directive)
    }
}

#[cfg(test)]
mod tests {
    use crate::ValueKind;

    use super::*;

    #[test]
    fn test_expand_including_wins_over_except() {
        let expand = ExpandDirective::default()
            .except(["puppetclasses", "hosts"])
            .including(["puppetclasses"]);

        assert!(!expand.omits("puppetclasses"));
        assert!(expand.expands("puppetclasses"));
        assert!(expand.omits("hosts"));
        assert!(!expand.expands("hosts"));
        assert!(expand.expands("environments"));
    }

    #[test]
    fn test_expand_none_keeps_only_forced() {
        let expand = ExpandDirective::default().none().including(["puppetclasses"]);

        assert!(!expand.expands("hosts"));
        assert!(!expand.omits("hosts"));
        assert!(expand.expands("puppetclasses"));
    }

    #[test]
    fn test_build_rejects_incompatible_duplicate_options() {
        let err = CompositionDirective::builder()
            .option(OptionSpec::new("override", ValueKind::Bool))
            .option(OptionSpec::new("override", ValueKind::String))
            .build()
            .unwrap_err();

        assert_eq!(
            err,
            CompositionError::ConflictingOption {
                name: "override".to_string(),
                first: "bool",
                second: "string",
            }
        );
    }

    #[test]
    fn test_build_keeps_last_compatible_duplicate() {
        let directive = CompositionDirective::builder()
            .option(OptionSpec::new("value", ValueKind::String))
            .option(OptionSpec::new("required", ValueKind::Bool))
            .option(OptionSpec::new("value", ValueKind::String).with_description("second"))
            .build()
            .unwrap();

        let names: Vec<_> = directive
            .extra_options
            .iter()
            .map(|o| o.name.as_str())
            .collect();
        assert_eq!(names, vec!["required", "value"]);
        assert_eq!(
            directive.extra_options[1].description.as_deref(),
            Some("second")
        );
    }

    #[test]
    fn test_expand_calls_accumulate() {
        let directive = CompositionDirective::builder()
            .expand(|e| e.except(["smart_variables"]))
            .expand(|e| e.including(["puppetclasses"]))
            .build()
            .unwrap();

        assert!(directive.expand.except.contains("smart_variables"));
        assert!(directive.expand.including.contains("puppetclasses"));
    }
}
