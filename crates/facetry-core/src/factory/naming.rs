//! Display names and descriptions.

use super::{ClassContext, FacetFactory, MemberContext, ParameterContext, feature_annotation};
use crate::facet::{DescribedAsFacet, NamedFacet, Precedence};
use crate::reflect::Annotation;
use crate::{FeatureType, MetamodelError, TypeRef, natural_name};

/// Natural names derived from identifiers: `firstName` → `First Name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamedFacetFactory;

impl FacetFactory for NamedFacetFactory {
    fn name(&self) -> &'static str {
        "named"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::EVERYTHING
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) -> Result<(), MetamodelError> {
        let simple = TypeRef::named(ctx.class.name.as_str());
        ctx.holder
            .add(NamedFacet::new(natural_name(simple.simple_name()), Precedence::Inferred));
        Ok(())
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        ctx.holder
            .add(NamedFacet::new(natural_name(ctx.member_id), Precedence::Inferred));
        Ok(())
    }

    fn process_parameter(&self, ctx: &mut ParameterContext<'_>) -> Result<(), MetamodelError> {
        let name = match &ctx.param.name {
            Some(declared) => natural_name(declared),
            None => natural_name(ctx.param.type_ref.simple_name()),
        };
        ctx.holder.add(NamedFacet::new(name, Precedence::Inferred));
        Ok(())
    }
}

/// `@Named(value)` or the `named` attribute of the element's own annotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NamedAnnotationFacetFactory;

impl NamedAnnotationFacetFactory {
    fn explicit_name<'a>(
        annotations: &'a [Annotation],
        feature_type: FeatureType,
    ) -> Option<&'a str> {
        let feature = feature_annotation(feature_type);
        let from_feature = annotations
            .iter()
            .find(|a| a.name == feature)
            .and_then(|a| a.text("named"));
        let from_named = annotations
            .iter()
            .find(|a| a.name == "Named")
            .and_then(|a| a.text("value"));
        from_named.or(from_feature)
    }
}

impl FacetFactory for NamedAnnotationFacetFactory {
    fn name(&self) -> &'static str {
        "named_annotation"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::EVERYTHING
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) -> Result<(), MetamodelError> {
        let name = Self::explicit_name(&ctx.class.annotations, FeatureType::Object);
        ctx.holder
            .add_optional(name.map(|n| NamedFacet::new(n, Precedence::Explicit)));
        Ok(())
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        let name = Self::explicit_name(&ctx.method.annotations, ctx.feature_type);
        ctx.holder
            .add_optional(name.map(|n| NamedFacet::new(n, Precedence::Explicit)));
        Ok(())
    }

    fn process_parameter(&self, ctx: &mut ParameterContext<'_>) -> Result<(), MetamodelError> {
        let name = Self::explicit_name(&ctx.param.annotations, FeatureType::ActionParameter);
        ctx.holder
            .add_optional(name.map(|n| NamedFacet::new(n, Precedence::Explicit)));
        Ok(())
    }
}

/// `@DescribedAs(value)` or the `describedAs` attribute of the element's own
/// annotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescribedAsAnnotationFacetFactory;

impl DescribedAsAnnotationFacetFactory {
    fn description(annotations: &[Annotation], feature_type: FeatureType) -> Option<DescribedAsFacet> {
        let feature = feature_annotation(feature_type);
        annotations
            .iter()
            .find(|a| a.name == "DescribedAs")
            .and_then(|a| a.text("value"))
            .or_else(|| {
                annotations
                    .iter()
                    .find(|a| a.name == feature)
                    .and_then(|a| a.text("describedAs"))
            })
            .map(|text| DescribedAsFacet::new(text, Precedence::Explicit))
    }
}

impl FacetFactory for DescribedAsAnnotationFacetFactory {
    fn name(&self) -> &'static str {
        "described_as_annotation"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::EVERYTHING
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) -> Result<(), MetamodelError> {
        ctx.holder
            .add_optional(Self::description(&ctx.class.annotations, FeatureType::Object));
        Ok(())
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        ctx.holder
            .add_optional(Self::description(&ctx.method.annotations, ctx.feature_type));
        Ok(())
    }

    fn process_parameter(&self, ctx: &mut ParameterContext<'_>) -> Result<(), MetamodelError> {
        ctx.holder.add_optional(Self::description(
            &ctx.param.annotations,
            FeatureType::ActionParameter,
        ));
        Ok(())
    }
}
