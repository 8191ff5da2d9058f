//! # Object Specifications
//!
//! The per-type aggregate of the metamodel: the type-level facets, the ordered
//! member list and the derived specialization.
//!
//! ## Build State
//!
//! A specification is created as a *placeholder* (under construction) and is
//! completed exactly once, when its introspection finishes. The body is
//! published through a `OnceLock`, so:
//! - the placeholder and the completed specification are the same allocation
//!   (the same `Arc` identity);
//! - completed specifications are read without any locking;
//! - nothing can mutate a specification after completion.
//!
//! While under construction a specification reports an empty facet holder and
//! an empty member list.

use crate::facet::{
    Facet, FacetHolder, FacetKind, NamedFacet, NotInstantiable, NotInstantiableFacet, TypeOfFacet,
};
use crate::{FeatureType, Identifier, MetamodelError, TypeRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

static EMPTY_HOLDER: FacetHolder = FacetHolder::new();

// =============================================================================
// SPECIALIZATION
// =============================================================================

/// What kind of type a specification describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialization {
    /// The `void` pseudo-type.
    Void,
    /// A collection container.
    Collection,
    /// A value type (built-in or `@Value`).
    Value,
    /// A domain service.
    Service,
    /// A view model.
    ViewModel,
    /// A persistent entity.
    Entity,
    /// An abstract type or interface.
    Abstract,
    /// A plain domain object.
    Object,
}

impl Specialization {
    /// Derive the specialization from the type-level facets.
    ///
    /// The first matching rule wins: void, collection, value, service,
    /// view model, entity, abstract, object.
    #[must_use]
    pub fn derive(facets: &FacetHolder) -> Self {
        let not_instantiable = facets
            .get_as::<NotInstantiableFacet>(FacetKind::NotInstantiable)
            .map(NotInstantiableFacet::reason);

        if not_instantiable == Some(NotInstantiable::Void) {
            Self::Void
        } else if facets.contains(FacetKind::CollectionType) {
            Self::Collection
        } else if facets.contains(FacetKind::ValueSemantics) {
            Self::Value
        } else if facets.contains(FacetKind::DomainService) {
            Self::Service
        } else if facets.contains(FacetKind::ViewModel) {
            Self::ViewModel
        } else if facets.contains(FacetKind::Entity) {
            Self::Entity
        } else if not_instantiable.is_some() {
            Self::Abstract
        } else {
            Self::Object
        }
    }

    /// Get the specialization name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Specialization::Void => "void",
            Specialization::Collection => "collection",
            Specialization::Value => "value",
            Specialization::Service => "service",
            Specialization::ViewModel => "view_model",
            Specialization::Entity => "entity",
            Specialization::Abstract => "abstract",
            Specialization::Object => "object",
        }
    }
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// MEMBERS
// =============================================================================

/// One positional parameter of an action. Owned by exactly one action.
#[derive(Debug)]
pub struct ParameterSpec {
    /// Zero-based position.
    pub index: usize,
    /// Declared type.
    pub type_ref: TypeRef,
    /// Declared name, if the source retains it.
    pub name: Option<String>,
    /// Parameter facets.
    pub facets: FacetHolder,
}

impl ParameterSpec {
    /// Display name: the `Named` facet, else the declared name, else `argN`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.facets
            .get_as::<NamedFacet>(FacetKind::Named)
            .map(|n| n.value().to_string())
            .or_else(|| self.name.clone())
            .unwrap_or_else(|| format!("arg{}", self.index))
    }
}

/// A property, collection or action of a type.
#[derive(Debug)]
pub struct ObjectMember {
    /// Property, collection or action.
    pub feature_type: FeatureType,
    /// Member id: bean name for accessors, method name for actions.
    pub id: String,
    /// Stable key of the member.
    pub identifier: Identifier,
    /// Accessor or action return type.
    pub return_type: TypeRef,
    /// Member facets.
    pub facets: FacetHolder,
    /// Action parameters, in declaration order (empty for accessors).
    pub parameters: Vec<ParameterSpec>,
}

impl ObjectMember {
    /// Display name: the `Named` facet, else the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.facets
            .get_as::<NamedFacet>(FacetKind::Named)
            .map_or(self.id.as_str(), NamedFacet::value)
    }

    /// Element type of a collection (or collection-returning action).
    #[must_use]
    pub fn element_type(&self) -> Option<&str> {
        self.facets
            .get_as::<TypeOfFacet>(FacetKind::TypeOf)
            .map(TypeOfFacet::element)
            .or_else(|| self.return_type.element_type())
    }

    /// Active facet of this kind, if any.
    #[must_use]
    pub fn facet(&self, kind: FacetKind) -> Option<&dyn Facet> {
        self.facets.get(kind)
    }

    /// Check if the member is a property.
    #[must_use]
    pub fn is_property(&self) -> bool {
        self.feature_type == FeatureType::Property
    }

    /// Check if the member is a collection.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.feature_type == FeatureType::Collection
    }

    /// Check if the member is an action.
    #[must_use]
    pub fn is_action(&self) -> bool {
        self.feature_type == FeatureType::Action
    }
}

/// A method that uses a reserved support prefix but supports no member.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RejectedMethod {
    /// Identifier of the offending method (as if it were an action).
    pub identifier: Identifier,
    /// Method name.
    pub method: String,
    /// The reserved prefix it carries.
    pub prefix: &'static str,
}

// =============================================================================
// OBJECT SPECIFICATION
// =============================================================================

/// Everything introspection produces for one type.
#[derive(Debug)]
pub struct SpecificationBody {
    /// Type-level facets.
    pub facets: FacetHolder,
    /// Members in presentation order.
    pub members: Vec<ObjectMember>,
    /// Derived specialization.
    pub specialization: Specialization,
    /// Direct super-type.
    pub superclass: Option<String>,
    /// Implemented interfaces.
    pub interfaces: Vec<String>,
    /// Reserved-prefix methods nothing consumed.
    pub rejected: Vec<RejectedMethod>,
}

/// The metamodel of one type.
#[derive(Debug)]
pub struct ObjectSpecification {
    type_name: String,
    identifier: Identifier,
    body: OnceLock<SpecificationBody>,
}

impl ObjectSpecification {
    /// Create a placeholder (under construction) for the named type.
    pub(crate) fn placeholder(type_name: &str) -> Result<Self, MetamodelError> {
        Ok(Self {
            type_name: type_name.to_string(),
            identifier: Identifier::class(type_name)?,
            body: OnceLock::new(),
        })
    }

    /// Publish the introspected body. Returns `false` if already complete.
    pub(crate) fn complete(&self, body: SpecificationBody) -> bool {
        self.body.set(body).is_ok()
    }

    /// Fully qualified type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Identifier of the type.
    #[must_use]
    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Check if introspection has finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.body.get().is_some()
    }

    /// Type-level facets (empty while under construction).
    #[must_use]
    pub fn facets(&self) -> &FacetHolder {
        self.body.get().map_or(&EMPTY_HOLDER, |b| &b.facets)
    }

    /// Active type-level facet of this kind, if any.
    #[must_use]
    pub fn facet(&self, kind: FacetKind) -> Option<&dyn Facet> {
        self.facets().get(kind)
    }

    /// Display name: the `Named` facet, else the type name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.facets()
            .get_as::<NamedFacet>(FacetKind::Named)
            .map_or(self.type_name.as_str(), NamedFacet::value)
    }

    /// Members in presentation order (empty while under construction).
    #[must_use]
    pub fn members(&self) -> &[ObjectMember] {
        match self.body.get() {
            Some(body) => &body.members,
            None => &[],
        }
    }

    /// Find a member by id.
    #[must_use]
    pub fn member(&self, id: &str) -> Option<&ObjectMember> {
        self.members().iter().find(|m| m.id == id)
    }

    /// Properties, in presentation order.
    pub fn properties(&self) -> impl Iterator<Item = &ObjectMember> {
        self.members().iter().filter(|m| m.is_property())
    }

    /// Collections, in presentation order.
    pub fn collections(&self) -> impl Iterator<Item = &ObjectMember> {
        self.members().iter().filter(|m| m.is_collection())
    }

    /// Actions, in presentation order.
    pub fn actions(&self) -> impl Iterator<Item = &ObjectMember> {
        self.members().iter().filter(|m| m.is_action())
    }

    /// Derived specialization; `None` while under construction.
    #[must_use]
    pub fn specialization(&self) -> Option<Specialization> {
        self.body.get().map(|b| b.specialization)
    }

    /// Check if instances can be created. `false` while under construction.
    #[must_use]
    pub fn is_instantiable(&self) -> bool {
        self.body
            .get()
            .is_some_and(|b| !b.facets.contains(FacetKind::NotInstantiable))
    }

    /// Direct super-type.
    #[must_use]
    pub fn superclass(&self) -> Option<&str> {
        self.body.get().and_then(|b| b.superclass.as_deref())
    }

    /// Implemented interfaces.
    #[must_use]
    pub fn interfaces(&self) -> &[String] {
        match self.body.get() {
            Some(body) => &body.interfaces,
            None => &[],
        }
    }

    /// Reserved-prefix methods that support nothing.
    #[must_use]
    pub fn rejected_methods(&self) -> &[RejectedMethod] {
        match self.body.get() {
            Some(body) => &body.rejected,
            None => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::{MarkerFacet, Precedence};

    fn body(facets: FacetHolder) -> SpecificationBody {
        let specialization = Specialization::derive(&facets);
        SpecificationBody {
            facets,
            members: Vec::new(),
            specialization,
            superclass: None,
            interfaces: Vec::new(),
            rejected: Vec::new(),
        }
    }

    #[test]
    fn placeholder_is_empty_until_completed() {
        let spec = ObjectSpecification::placeholder("Customer").expect("placeholder");
        assert!(!spec.is_complete());
        assert!(spec.facets().is_empty());
        assert!(spec.members().is_empty());
        assert_eq!(spec.specialization(), None);
        assert!(!spec.is_instantiable());

        assert!(spec.complete(body(FacetHolder::new())));
        assert!(spec.is_complete());
        assert_eq!(spec.specialization(), Some(Specialization::Object));
        assert!(spec.is_instantiable());
    }

    #[test]
    fn completion_happens_once() {
        let spec = ObjectSpecification::placeholder("Customer").expect("placeholder");
        assert!(spec.complete(body(FacetHolder::new())));

        let mut entity = FacetHolder::new();
        entity.add(MarkerFacet::new(FacetKind::Entity, Precedence::Explicit));
        assert!(!spec.complete(body(entity)));
        assert_eq!(spec.specialization(), Some(Specialization::Object));
    }

    #[test]
    fn specialization_priority() {
        let mut facets = FacetHolder::new();
        facets.add(MarkerFacet::new(FacetKind::Entity, Precedence::Explicit));
        assert_eq!(Specialization::derive(&facets), Specialization::Entity);

        facets.add(MarkerFacet::new(FacetKind::ValueSemantics, Precedence::Explicit));
        assert_eq!(Specialization::derive(&facets), Specialization::Value);

        let mut abstract_entity = FacetHolder::new();
        abstract_entity.add(NotInstantiableFacet::new(
            NotInstantiable::Abstract,
            Precedence::Inferred,
        ));
        assert_eq!(Specialization::derive(&abstract_entity), Specialization::Abstract);
        abstract_entity.add(MarkerFacet::new(FacetKind::Entity, Precedence::Explicit));
        assert_eq!(Specialization::derive(&abstract_entity), Specialization::Entity);

        let mut void = FacetHolder::new();
        void.add(NotInstantiableFacet::new(NotInstantiable::Void, Precedence::Inferred));
        void.add(MarkerFacet::new(FacetKind::CollectionType, Precedence::Inferred));
        assert_eq!(Specialization::derive(&void), Specialization::Void);
    }

    #[test]
    fn empty_placeholder_name_is_rejected() {
        assert!(ObjectSpecification::placeholder("").is_err());
    }
}
