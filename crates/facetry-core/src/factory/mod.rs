//! # Facet Factories
//!
//! A facet factory inspects one reflected element (the type, a member's
//! accessor or action method, or an action parameter) and conditionally
//! attaches facets to that element's holder.
//!
//! Factories are independent of each other. They are run in the fixed order of
//! the `FacetFactoryPipeline`; a later factory sees (and may outrank) what an
//! earlier one contributed. Conflicts are settled by `FacetHolder::add_facet`,
//! never by the factories themselves.

mod action;
mod layout;
mod naming;
mod object;
mod pipeline;
mod property;
mod remover;
mod support;

pub use action::{
    ActionInvocationFacetFactory, ActionSemanticsFacetFactory, HomePageAnnotationFacetFactory,
};
pub use layout::{
    DisabledAnnotationFacetFactory, HiddenAnnotationFacetFactory, IMMUTABLE_REASON,
    ImmutablePropagationFacetFactory, MemberOrderAnnotationFacetFactory,
};
pub use naming::{
    DescribedAsAnnotationFacetFactory, NamedAnnotationFacetFactory, NamedFacetFactory,
};
pub use object::{
    DomainObjectAnnotationFacetFactory, IgnoredMethodsFacetFactory, TitleFacetFactory,
    TypeKindFacetFactory,
};
pub use pipeline::FacetFactoryPipeline;
pub use property::{
    CollectionModifierFacetFactory, DERIVED_REASON, MandatoryFacetFactory,
    MaxLengthAnnotationFacetFactory, PropertyModifierFacetFactory, TypeOfFacetFactory,
};
pub use remover::MethodRemover;
pub use support::{SupportMethodFacetFactory, parameter_support_method, support_method};

use crate::facet::FacetHolder;
use crate::loader::SpecificationLoader;
use crate::reflect::{Annotation, ClassDescriptor, MethodDescriptor, ParamDescriptor};
use crate::{FeatureType, Identifier, MetamodelError};

// =============================================================================
// PROCESSING CONTEXTS
// =============================================================================

/// Everything a factory may look at (and touch) while processing the type.
pub struct ClassContext<'a> {
    /// The type being introspected.
    pub class: &'a ClassDescriptor,
    /// The type's identifier.
    pub identifier: &'a Identifier,
    /// The type-level holder.
    pub holder: &'a mut FacetHolder,
    /// Methods still available for member discovery.
    pub methods: &'a mut MethodRemover,
    /// The loader, for factories that need other specifications.
    pub loader: &'a SpecificationLoader,
}

/// Everything a factory may look at (and touch) while processing a member.
pub struct MemberContext<'a> {
    /// The owning type.
    pub class: &'a ClassDescriptor,
    /// Property, collection or action.
    pub feature_type: FeatureType,
    /// The accessor (property/collection) or action method.
    pub method: &'a MethodDescriptor,
    /// The member's identifier.
    pub identifier: &'a Identifier,
    /// Member id: the bean name for accessors, the method name for actions.
    pub member_id: &'a str,
    /// The owning type's holder, fully processed by the object factories.
    pub object_facets: &'a FacetHolder,
    /// The member holder.
    pub holder: &'a mut FacetHolder,
    /// Methods still available for member discovery.
    pub methods: &'a mut MethodRemover,
    /// The loader, for factories that need other specifications.
    pub loader: &'a SpecificationLoader,
}

impl MemberContext<'_> {
    /// Find a method annotation by name.
    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.method.annotation(name)
    }
}

/// Everything a factory may look at (and touch) while processing a parameter.
pub struct ParameterContext<'a> {
    /// The owning type.
    pub class: &'a ClassDescriptor,
    /// The owning action method.
    pub action: &'a MethodDescriptor,
    /// The owning action's identifier.
    pub identifier: &'a Identifier,
    /// Zero-based position.
    pub index: usize,
    /// The parameter itself.
    pub param: &'a ParamDescriptor,
    /// The parameter holder.
    pub holder: &'a mut FacetHolder,
    /// Methods still available for member discovery.
    pub methods: &'a mut MethodRemover,
    /// The loader, for factories that need other specifications.
    pub loader: &'a SpecificationLoader,
}

impl ParameterContext<'_> {
    /// Find a parameter annotation by name.
    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.param.annotation(name)
    }
}

// =============================================================================
// FACET FACTORY TRAIT
// =============================================================================

/// A contributor of facets.
///
/// Factories declare the feature types they process; the pipeline only calls
/// the matching `process_*` method for those. An error aborts introspection of
/// the whole type.
pub trait FacetFactory: Send + Sync {
    /// Stable name, used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Feature types this factory processes.
    fn feature_types(&self) -> &'static [FeatureType];

    /// Process the type itself.
    fn process_class(&self, _ctx: &mut ClassContext<'_>) -> Result<(), MetamodelError> {
        Ok(())
    }

    /// Process a property, collection or action.
    fn process_member(&self, _ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        Ok(())
    }

    /// Process one action parameter.
    fn process_parameter(&self, _ctx: &mut ParameterContext<'_>) -> Result<(), MetamodelError> {
        Ok(())
    }
}

/// Annotation names that carry member-level attributes for a feature type.
///
/// `@Property(named = ..)`, `@Collection(named = ..)`, `@Action(named = ..)`,
/// `@Parameter(named = ..)`, `@DomainObject(named = ..)`.
#[must_use]
pub fn feature_annotation(feature_type: FeatureType) -> &'static str {
    match feature_type {
        FeatureType::Object => "DomainObject",
        FeatureType::Property => "Property",
        FeatureType::Collection => "Collection",
        FeatureType::Action => "Action",
        FeatureType::ActionParameter => "Parameter",
    }
}
