//! # Facets
//!
//! A facet is one composable capability attached to a structural element:
//! "this property is mandatory", "this action is safe", "this member is named
//! 'Full Name'". Facets are keyed by capability (`FacetKind`), not by the
//! factory that contributed them, and carry a `Precedence` used to resolve
//! competing contributions on the same holder.

mod builtin;
mod holder;

pub use builtin::*;
pub use holder::{FacetConflict, FacetHolder, Resolution};

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;

// =============================================================================
// PRECEDENCE
// =============================================================================

/// Strength of a facet contribution.
///
/// Ordered `Inferred < Default < High < Explicit`. On a holder the strictly
/// stronger contribution wins; among equals the later contribution wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// Guessed from names, signatures or structure.
    Inferred,
    /// Framework default policy.
    Default,
    /// Imperative conventions (support methods) and type-level refinements.
    High,
    /// Declared by an annotation.
    Explicit,
}

impl Precedence {
    /// Get the precedence name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Precedence::Inferred => "inferred",
            Precedence::Default => "default",
            Precedence::High => "high",
            Precedence::Explicit => "explicit",
        }
    }
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// FACET KIND (capability key)
// =============================================================================

/// Capability key. A holder carries at most one active facet per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
    // naming
    Named,
    DescribedAs,
    // visibility
    Hidden,
    HideMethod,
    // usability
    Disabled,
    DisableMethod,
    Immutable,
    // validation
    MaxLength,
    Mandatory,
    ValidateMethod,
    // inputs
    ChoicesMethod,
    DefaultMethod,
    AutoCompleteMethod,
    // modification
    PropertySetter,
    PropertyClear,
    CollectionAddTo,
    CollectionRemoveFrom,
    CollectionSetter,
    CollectionClear,
    // actions
    ActionInvocation,
    ActionSemantics,
    HomePage,
    // layout
    Title,
    MemberOrder,
    // typing and specialization
    TypeOf,
    CollectionType,
    ValueSemantics,
    Entity,
    ViewModel,
    DomainService,
    NotInstantiable,
}

impl FacetKind {
    /// Get the capability name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            FacetKind::Named => "named",
            FacetKind::DescribedAs => "described_as",
            FacetKind::Hidden => "hidden",
            FacetKind::HideMethod => "hide_method",
            FacetKind::Disabled => "disabled",
            FacetKind::DisableMethod => "disable_method",
            FacetKind::Immutable => "immutable",
            FacetKind::MaxLength => "max_length",
            FacetKind::Mandatory => "mandatory",
            FacetKind::ValidateMethod => "validate_method",
            FacetKind::ChoicesMethod => "choices_method",
            FacetKind::DefaultMethod => "default_method",
            FacetKind::AutoCompleteMethod => "auto_complete_method",
            FacetKind::PropertySetter => "property_setter",
            FacetKind::PropertyClear => "property_clear",
            FacetKind::CollectionAddTo => "collection_add_to",
            FacetKind::CollectionRemoveFrom => "collection_remove_from",
            FacetKind::CollectionSetter => "collection_setter",
            FacetKind::CollectionClear => "collection_clear",
            FacetKind::ActionInvocation => "action_invocation",
            FacetKind::ActionSemantics => "action_semantics",
            FacetKind::HomePage => "home_page",
            FacetKind::Title => "title",
            FacetKind::MemberOrder => "member_order",
            FacetKind::TypeOf => "type_of",
            FacetKind::CollectionType => "collection_type",
            FacetKind::ValueSemantics => "value_semantics",
            FacetKind::Entity => "entity",
            FacetKind::ViewModel => "view_model",
            FacetKind::DomainService => "domain_service",
            FacetKind::NotInstantiable => "not_instantiable",
        }
    }
}

impl fmt::Display for FacetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// FACET TRAIT
// =============================================================================

/// A typed capability instance.
///
/// Facets must be `Send + Sync`: completed specifications are read
/// concurrently by every consumer of the metamodel.
pub trait Facet: Any + Send + Sync + fmt::Debug {
    /// The capability this facet satisfies.
    fn kind(&self) -> FacetKind;

    /// Strength of this contribution.
    fn precedence(&self) -> Precedence;

    /// Flat attribute view, used for export and conflict detection.
    ///
    /// Two facets of one kind with equal attributes are interchangeable.
    fn attributes(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Downcast support.
    fn as_any(&self) -> &dyn Any;
}

/// Render an attribute list as `key=value, key=value`.
#[must_use]
pub fn describe_attributes(attributes: &[(&'static str, String)]) -> String {
    attributes
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_ordering() {
        assert!(Precedence::Inferred < Precedence::Default);
        assert!(Precedence::Default < Precedence::High);
        assert!(Precedence::High < Precedence::Explicit);
    }

    #[test]
    fn attribute_rendering() {
        let attrs = vec![("value", "Full Name".to_string()), ("x", "1".to_string())];
        assert_eq!(describe_attributes(&attrs), "value=Full Name, x=1");
        assert_eq!(describe_attributes(&[]), "");
    }
}
