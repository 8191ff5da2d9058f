//! # Validation
//!
//! The whole-model consistency pass that runs after introspection.
//!
//! Validators are registered independently. Each is scoped to one feature
//! type and starts a fresh private pass per run; the engine walks every
//! element of that kind across all specifications in type-name order and
//! hands it to the pass. Findings accumulate in a shared `ValidationFailures`
//! set, so the result does not depend on validator order. Validators never
//! error on a finding; escalating is the caller's decision.

mod validators;

pub use validators::{
    ChoicesAutoCompleteValidator, CollectionElementTypeValidator, DuplicateMemberValidator,
    FacetConflictValidator, IncompleteSpecificationValidator, RejectedMethodValidator,
    SpecializationConflictValidator, UniqueHomePageValidator,
};

use crate::config::ValidationConfig;
use crate::specification::{ObjectMember, ObjectSpecification, ParameterSpec};
use crate::{FeatureType, Identifier, MetamodelError};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// FAILURES
// =============================================================================

/// One model-consistency problem.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ValidationFailure {
    /// The offending element.
    pub identifier: Identifier,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.identifier, self.message)
    }
}

/// The set of failures collected by one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationFailures(BTreeSet<ValidationFailure>);

impl ValidationFailures {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure. Duplicates collapse.
    pub fn add(&mut self, identifier: Identifier, message: impl Into<String>) {
        self.0.insert(ValidationFailure {
            identifier,
            message: message.into(),
        });
    }

    /// Check if the model is consistent.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Failures in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationFailure> {
        self.0.iter()
    }

    /// Rendered failures in identifier order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }

    /// Escalate to a single aggregate error unless empty.
    pub fn into_result(self) -> Result<(), MetamodelError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(MetamodelError::Validation(self))
        }
    }
}

impl<'a> IntoIterator for &'a ValidationFailures {
    type Item = &'a ValidationFailure;
    type IntoIter = std::collections::btree_set::Iter<'a, ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// =============================================================================
// VALIDATORS
// =============================================================================

/// One element handed to a validation pass.
#[derive(Debug, Clone, Copy)]
pub enum Element<'a> {
    /// A type.
    Object(&'a ObjectSpecification),
    /// A property, collection or action of a type.
    Member(&'a ObjectSpecification, &'a ObjectMember),
    /// A parameter of an action.
    Parameter(&'a ObjectSpecification, &'a ObjectMember, &'a ParameterSpec),
}

/// Per-run state of one validator.
pub trait ValidationPass {
    /// Inspect one element.
    fn visit(&mut self, element: Element<'_>, failures: &mut ValidationFailures);

    /// Called once after the last element.
    fn finish(&mut self, _failures: &mut ValidationFailures) {}
}

/// A whole-model consistency check.
pub trait MetamodelValidator: Send + Sync {
    /// Stable name, used for configuration and logs.
    fn name(&self) -> &'static str;

    /// The kind of element this validator visits.
    fn feature_type(&self) -> FeatureType;

    /// Start a fresh pass.
    fn begin(&self) -> Box<dyn ValidationPass>;
}

// =============================================================================
// ENGINE
// =============================================================================

/// Runs the registered validators over a set of specifications.
#[derive(Default)]
pub struct ValidationEngine {
    validators: Vec<Box<dyn MetamodelValidator>>,
}

impl ValidationEngine {
    /// Create an engine without validators.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard validators, minus those disabled in `config`.
    #[must_use]
    pub fn standard(config: &ValidationConfig) -> Self {
        let candidates: Vec<Box<dyn MetamodelValidator>> = vec![
            Box::new(IncompleteSpecificationValidator),
            Box::new(RejectedMethodValidator),
            Box::new(DuplicateMemberValidator),
            Box::new(FacetConflictValidator),
            Box::new(SpecializationConflictValidator),
            Box::new(UniqueHomePageValidator),
            Box::new(ChoicesAutoCompleteValidator::new(FeatureType::Property)),
            Box::new(ChoicesAutoCompleteValidator::new(FeatureType::ActionParameter)),
            Box::new(CollectionElementTypeValidator),
        ];
        Self {
            validators: candidates
                .into_iter()
                .filter(|v| config.is_enabled(v.name()))
                .collect(),
        }
    }

    /// Register a validator.
    pub fn register(&mut self, validator: impl MetamodelValidator + 'static) {
        self.validators.push(Box::new(validator));
    }

    /// Validator names, in run order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.validators.iter().map(|v| v.name()).collect()
    }

    /// Number of registered validators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Check if no validators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Run every validator over `specs`.
    #[must_use]
    pub fn validate(&self, specs: &[Arc<ObjectSpecification>]) -> ValidationFailures {
        let mut ordered: Vec<&ObjectSpecification> = specs.iter().map(Arc::as_ref).collect();
        ordered.sort_by(|a, b| a.type_name().cmp(b.type_name()));

        let mut failures = ValidationFailures::new();
        for validator in &self.validators {
            let before = failures.len();
            let mut pass = validator.begin();
            let feature_type = validator.feature_type();
            for spec in &ordered {
                visit_spec(spec, feature_type, pass.as_mut(), &mut failures);
            }
            pass.finish(&mut failures);
            tracing::debug!(
                validator = validator.name(),
                found = failures.len() - before,
                "validator finished"
            );
        }

        tracing::info!(
            specifications = ordered.len(),
            failures = failures.len(),
            "validation pass complete"
        );
        failures
    }
}

impl fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationEngine")
            .field("validators", &self.names())
            .finish()
    }
}

fn visit_spec(
    spec: &ObjectSpecification,
    feature_type: FeatureType,
    pass: &mut dyn ValidationPass,
    failures: &mut ValidationFailures,
) {
    match feature_type {
        FeatureType::Object => pass.visit(Element::Object(spec), failures),
        FeatureType::Property | FeatureType::Collection | FeatureType::Action => {
            for member in spec.members().iter().filter(|m| m.feature_type == feature_type) {
                pass.visit(Element::Member(spec, member), failures);
            }
        }
        FeatureType::ActionParameter => {
            for action in spec.actions() {
                for param in &action.parameters {
                    pass.visit(Element::Parameter(spec, action, param), failures);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Identifier {
        Identifier::class(name).expect("id")
    }

    #[test]
    fn failures_are_a_set() {
        let mut failures = ValidationFailures::new();
        failures.add(id("B"), "broken");
        failures.add(id("A"), "broken");
        failures.add(id("B"), "broken");
        assert_eq!(failures.len(), 2);
        assert_eq!(failures.messages(), vec!["A: broken", "B: broken"]);
    }

    #[test]
    fn empty_failures_escalate_to_ok() {
        assert!(ValidationFailures::new().into_result().is_ok());

        let mut failures = ValidationFailures::new();
        failures.add(id("A"), "broken");
        let error = failures.into_result().expect_err("must escalate");
        assert!(matches!(&error, MetamodelError::Validation(f) if f.len() == 1));
        assert_eq!(error.to_string(), "Metamodel validation failed with 1 failure(s)");
    }

    #[test]
    fn disabled_validators_are_not_registered() {
        let config = ValidationConfig {
            disabled_validators: vec!["unique_home_page".to_string()],
            ..ValidationConfig::default()
        };
        let engine = ValidationEngine::standard(&config);
        assert!(!engine.names().contains(&"unique_home_page"));
        assert!(engine.names().contains(&"duplicate_member"));
    }
}
