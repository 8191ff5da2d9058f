//! Property and collection factories: modifiers, element types, mandatory, max length.

use super::{FacetFactory, MemberContext, ParameterContext, feature_annotation};
use crate::facet::{
    DisabledFacet, FacetKind, MandatoryFacet, MaxLengthFacet, Precedence, SupportMethodFacet,
    TypeOfFacet,
};
use crate::primitives::{ADD_TO_PREFIX, CLEAR_PREFIX, MODIFY_PREFIX, REMOVE_FROM_PREFIX, SET_PREFIX};
use crate::reflect::Annotation;
use crate::{FeatureType, Identifier, MetamodelError, capitalize};

/// Reason carried by the `Disabled` facet of a property without a setter.
pub const DERIVED_REASON: &str = "derived";

/// Consumes `setXxx`, `modifyXxx` and `clearXxx`.
///
/// `modifyXxx` takes over from `setXxx` when both exist. A property with
/// neither is derived and gets an inferred `Disabled` facet.
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertyModifierFacetFactory;

impl FacetFactory for PropertyModifierFacetFactory {
    fn name(&self) -> &'static str {
        "property_modifier"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PROPERTIES_ONLY
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        let suffix = capitalize(ctx.member_id);
        let setter = format!("{SET_PREFIX}{suffix}");
        let modify = format!("{MODIFY_PREFIX}{suffix}");
        let clear = format!("{CLEAR_PREFIX}{suffix}");

        let setter = ctx.methods.remove_named(&setter).map(|m| m.name);
        let modify = ctx.methods.remove_named(&modify).map(|m| m.name);
        match modify.or(setter) {
            Some(method) => {
                ctx.holder.add(SupportMethodFacet::new(
                    FacetKind::PropertySetter,
                    method,
                    Precedence::High,
                ));
            }
            None => {
                ctx.holder
                    .add(DisabledFacet::new(DERIVED_REASON, Precedence::Inferred));
            }
        }

        if let Some(method) = ctx.methods.remove_named(&clear) {
            ctx.holder.add(SupportMethodFacet::new(
                FacetKind::PropertyClear,
                method.name,
                Precedence::High,
            ));
        }
        Ok(())
    }
}

/// Consumes `addToXxx` and `removeFromXxx`, plus whole-collection
/// `setXxx`/`modifyXxx` and `clearXxx`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionModifierFacetFactory;

impl FacetFactory for CollectionModifierFacetFactory {
    fn name(&self) -> &'static str {
        "collection_modifier"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::COLLECTIONS_ONLY
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        let suffix = capitalize(ctx.member_id);
        let callbacks = [
            (ADD_TO_PREFIX, FacetKind::CollectionAddTo),
            (REMOVE_FROM_PREFIX, FacetKind::CollectionRemoveFrom),
            (CLEAR_PREFIX, FacetKind::CollectionClear),
        ];
        for (prefix, kind) in callbacks {
            if let Some(method) = ctx.methods.remove_named(&format!("{prefix}{suffix}")) {
                ctx.holder
                    .add(SupportMethodFacet::new(kind, method.name, Precedence::High));
            }
        }

        let setter = ctx.methods.remove_named(&format!("{SET_PREFIX}{suffix}"));
        let modify = ctx.methods.remove_named(&format!("{MODIFY_PREFIX}{suffix}"));
        if let Some(method) = modify.or(setter) {
            ctx.holder.add(SupportMethodFacet::new(
                FacetKind::CollectionSetter,
                method.name,
                Precedence::High,
            ));
        }
        Ok(())
    }
}

/// Element type of a collection or collection-returning action.
///
/// Inferred from a generic return type (`list<Order>`); `typeOf` on the
/// member's own annotation is explicit.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeOfFacetFactory;

const COLLECTIONS_AND_ACTIONS: &[FeatureType] = &[FeatureType::Collection, FeatureType::Action];

impl FacetFactory for TypeOfFacetFactory {
    fn name(&self) -> &'static str {
        "type_of"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        COLLECTIONS_AND_ACTIONS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        if let Some(element) = ctx.method.returns.element_type() {
            ctx.holder
                .add(TypeOfFacet::new(element, Precedence::Inferred));
        }
        let explicit = ctx
            .annotation(feature_annotation(ctx.feature_type))
            .and_then(|a| a.text("typeOf"));
        ctx.holder
            .add_optional(explicit.map(|e| TypeOfFacet::new(e, Precedence::Explicit)));
        Ok(())
    }
}

/// Properties and parameters are mandatory unless declared optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct MandatoryFacetFactory;

impl MandatoryFacetFactory {
    fn declared(annotations: &[Annotation], feature_type: FeatureType) -> Option<MandatoryFacet> {
        if annotations.iter().any(|a| a.name == "Optional") {
            return Some(MandatoryFacet::optional(Precedence::Explicit));
        }
        let feature = feature_annotation(feature_type);
        let optionality = annotations
            .iter()
            .find(|a| a.name == feature)
            .and_then(|a| a.text("optionality"))?;
        if optionality.eq_ignore_ascii_case("optional") {
            Some(MandatoryFacet::optional(Precedence::Explicit))
        } else if optionality.eq_ignore_ascii_case("mandatory") {
            Some(MandatoryFacet::required(Precedence::Explicit))
        } else {
            None
        }
    }
}

impl FacetFactory for MandatoryFacetFactory {
    fn name(&self) -> &'static str {
        "mandatory"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PROPERTIES_AND_PARAMETERS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        ctx.holder.add(MandatoryFacet::required(Precedence::Default));
        ctx.holder
            .add_optional(Self::declared(&ctx.method.annotations, ctx.feature_type));
        Ok(())
    }

    fn process_parameter(&self, ctx: &mut ParameterContext<'_>) -> Result<(), MetamodelError> {
        ctx.holder.add(MandatoryFacet::required(Precedence::Default));
        ctx.holder.add_optional(Self::declared(
            &ctx.param.annotations,
            FeatureType::ActionParameter,
        ));
        Ok(())
    }
}

/// `@MaxLength(value)` or the `maxLength` attribute of the element's own annotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxLengthAnnotationFacetFactory;

impl MaxLengthAnnotationFacetFactory {
    fn declared(
        &self,
        annotations: &[Annotation],
        feature_type: FeatureType,
        identifier: &Identifier,
    ) -> Result<Option<MaxLengthFacet>, MetamodelError> {
        let feature = feature_annotation(feature_type);
        let value = annotations
            .iter()
            .find(|a| a.name == "MaxLength")
            .and_then(|a| a.int("value"))
            .or_else(|| {
                annotations
                    .iter()
                    .find(|a| a.name == feature)
                    .and_then(|a| a.int("maxLength"))
            });
        let Some(value) = value else {
            return Ok(None);
        };
        let value = usize::try_from(value).map_err(|_| MetamodelError::FactoryFailed {
            factory: self.name(),
            identifier: identifier.clone(),
            reason: format!("max length must not be negative, got {value}"),
        })?;
        Ok(Some(MaxLengthFacet::new(value, Precedence::Explicit)))
    }
}

impl FacetFactory for MaxLengthAnnotationFacetFactory {
    fn name(&self) -> &'static str {
        "max_length_annotation"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PROPERTIES_AND_PARAMETERS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        let facet = self.declared(&ctx.method.annotations, ctx.feature_type, ctx.identifier)?;
        ctx.holder.add_optional(facet);
        Ok(())
    }

    fn process_parameter(&self, ctx: &mut ParameterContext<'_>) -> Result<(), MetamodelError> {
        let facet = self.declared(
            &ctx.param.annotations,
            FeatureType::ActionParameter,
            ctx.identifier,
        )?;
        ctx.holder.add_optional(facet);
        Ok(())
    }
}
