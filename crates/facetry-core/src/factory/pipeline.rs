//! The ordered factory pipeline.

use super::{
    ActionInvocationFacetFactory, ActionSemanticsFacetFactory, ClassContext,
    CollectionModifierFacetFactory, DescribedAsAnnotationFacetFactory,
    DisabledAnnotationFacetFactory, DomainObjectAnnotationFacetFactory, FacetFactory,
    HiddenAnnotationFacetFactory, HomePageAnnotationFacetFactory, IgnoredMethodsFacetFactory,
    ImmutablePropagationFacetFactory, MandatoryFacetFactory, MaxLengthAnnotationFacetFactory,
    MemberContext, MemberOrderAnnotationFacetFactory, NamedAnnotationFacetFactory,
    NamedFacetFactory, ParameterContext, PropertyModifierFacetFactory, SupportMethodFacetFactory,
    TitleFacetFactory, TypeKindFacetFactory, TypeOfFacetFactory,
};
use crate::config::ReflectorConfig;
use crate::{FeatureType, Identifier, MetamodelError};

/// A fixed, ordered list of facet factories.
///
/// For each element the pipeline calls, in registration order, every factory
/// that declares the element's feature type. The first error aborts the
/// element (and with it the whole type).
#[derive(Default)]
pub struct FacetFactoryPipeline {
    factories: Vec<Box<dyn FacetFactory>>,
}

impl FacetFactoryPipeline {
    /// Create an empty pipeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard programming model.
    #[must_use]
    pub fn standard(config: &ReflectorConfig) -> Self {
        let mut pipeline = Self::new()
            .with_factory(IgnoredMethodsFacetFactory::new(config.ignored_methods.clone()))
            .with_factory(TypeKindFacetFactory)
            .with_factory(DomainObjectAnnotationFacetFactory)
            .with_factory(TitleFacetFactory)
            .with_factory(NamedFacetFactory)
            .with_factory(NamedAnnotationFacetFactory)
            .with_factory(DescribedAsAnnotationFacetFactory)
            .with_factory(PropertyModifierFacetFactory)
            .with_factory(CollectionModifierFacetFactory)
            .with_factory(TypeOfFacetFactory)
            .with_factory(ActionInvocationFacetFactory)
            .with_factory(ActionSemanticsFacetFactory)
            .with_factory(HomePageAnnotationFacetFactory);

        for support in SupportMethodFacetFactory::standard() {
            pipeline.register(support);
        }

        pipeline
            .with_factory(MandatoryFacetFactory)
            .with_factory(MaxLengthAnnotationFacetFactory)
            .with_factory(HiddenAnnotationFacetFactory)
            .with_factory(DisabledAnnotationFacetFactory)
            .with_factory(ImmutablePropagationFacetFactory)
            .with_factory(MemberOrderAnnotationFacetFactory)
    }

    /// Append a factory (builder style).
    #[must_use]
    pub fn with_factory(mut self, factory: impl FacetFactory + 'static) -> Self {
        self.register(factory);
        self
    }

    /// Append a factory; it runs after every factory already registered.
    pub fn register(&mut self, factory: impl FacetFactory + 'static) {
        self.factories.push(Box::new(factory));
    }

    /// Insert a factory ahead of every factory already registered.
    pub fn prepend(&mut self, factory: impl FacetFactory + 'static) {
        self.factories.insert(0, Box::new(factory));
    }

    /// Number of registered factories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Check if no factories are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Factory names, in run order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.factories.iter().map(|f| f.name()).collect()
    }

    fn applicable(&self, feature_type: FeatureType) -> impl Iterator<Item = &dyn FacetFactory> {
        self.factories
            .iter()
            .map(|f| f.as_ref())
            .filter(move |f| f.feature_types().contains(&feature_type))
    }

    /// Run every object factory over the type.
    pub fn process_class(&self, ctx: &mut ClassContext<'_>) -> Result<(), MetamodelError> {
        for factory in self.applicable(FeatureType::Object) {
            factory
                .process_class(ctx)
                .map_err(|e| failure(factory, ctx.identifier, e))?;
        }
        Ok(())
    }

    /// Run every factory of the member's feature type over the member.
    pub fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        for factory in self.applicable(ctx.feature_type) {
            factory
                .process_member(ctx)
                .map_err(|e| failure(factory, ctx.identifier, e))?;
        }
        Ok(())
    }

    /// Run every parameter factory over one action parameter.
    pub fn process_parameter(&self, ctx: &mut ParameterContext<'_>) -> Result<(), MetamodelError> {
        for factory in self.applicable(FeatureType::ActionParameter) {
            factory
                .process_parameter(ctx)
                .map_err(|e| failure(factory, ctx.identifier, e))?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for FacetFactoryPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacetFactoryPipeline")
            .field("factories", &self.names())
            .finish()
    }
}

/// Attribute a factory error to the factory and element it came from.
fn failure(factory: &dyn FacetFactory, identifier: &Identifier, error: MetamodelError) -> MetamodelError {
    match error {
        already @ MetamodelError::FactoryFailed { .. } => already,
        other => MetamodelError::FactoryFailed {
            factory: factory.name(),
            identifier: identifier.clone(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Probe(&'static str);

    impl FacetFactory for Probe {
        fn name(&self) -> &'static str {
            self.0
        }

        fn feature_types(&self) -> &'static [FeatureType] {
            FeatureType::OBJECTS_ONLY
        }
    }

    #[test]
    fn standard_order_is_fixed() {
        let pipeline = FacetFactoryPipeline::standard(&ReflectorConfig::default());
        let names = pipeline.names();
        assert_eq!(names.first(), Some(&"ignored_methods"));
        assert_eq!(names.last(), Some(&"member_order_annotation"));

        let position = |name: &str| names.iter().position(|n| *n == name);
        assert!(position("named") < position("named_annotation"));
        assert!(position("property_modifier") < position("hide_method"));
        assert!(position("domain_object_annotation") < position("immutable_propagation"));
    }

    #[test]
    fn prepend_runs_first_register_runs_last() {
        let mut pipeline = FacetFactoryPipeline::new().with_factory(Probe("middle"));
        pipeline.prepend(Probe("first"));
        pipeline.register(Probe("last"));
        assert_eq!(pipeline.names(), vec!["first", "middle", "last"]);
        assert_eq!(pipeline.len(), 3);
    }

    #[test]
    fn errors_are_attributed_to_factory() {
        let identifier = Identifier::class("Customer").expect("id");
        let probe = Probe("probe");
        let wrapped = failure(&probe, &identifier, MetamodelError::UnknownType("X".into()));
        assert!(matches!(
            &wrapped,
            MetamodelError::FactoryFailed { factory: "probe", reason, .. }
                if reason.contains("Unknown type")
        ));

        let nested = failure(&Probe("outer"), &identifier, wrapped);
        assert!(matches!(
            nested,
            MetamodelError::FactoryFailed { factory: "probe", .. }
        ));
    }
}
