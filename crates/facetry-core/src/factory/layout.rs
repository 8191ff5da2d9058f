//! Visibility, usability and ordering annotations.

use super::{FacetFactory, MemberContext, feature_annotation};
use crate::facet::{DisabledFacet, FacetKind, MarkerFacet, MemberOrderFacet, Precedence};
use crate::reflect::AnnotationValue;
use crate::{FeatureType, MetamodelError};

/// Reason carried by `Disabled` facets inherited from an immutable type.
pub const IMMUTABLE_REASON: &str = "immutable";

/// `@Hidden` or `hidden = true` on the member's own annotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct HiddenAnnotationFacetFactory;

impl FacetFactory for HiddenAnnotationFacetFactory {
    fn name(&self) -> &'static str {
        "hidden_annotation"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::MEMBERS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        let hidden = ctx.method.has_annotation("Hidden")
            || ctx
                .annotation(feature_annotation(ctx.feature_type))
                .and_then(|a| a.flag("hidden"))
                .unwrap_or(false);
        if hidden {
            ctx.holder
                .add(MarkerFacet::new(FacetKind::Hidden, Precedence::Explicit));
        }
        Ok(())
    }
}

/// `@Disabled(reason)` or `editing = "disabled"` on the member's own annotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAnnotationFacetFactory;

impl FacetFactory for DisabledAnnotationFacetFactory {
    fn name(&self) -> &'static str {
        "disabled_annotation"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::MEMBERS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        if let Some(disabled) = ctx.annotation("Disabled") {
            let reason = disabled.text("reason").unwrap_or("disabled");
            ctx.holder
                .add(DisabledFacet::new(reason, Precedence::Explicit));
            return Ok(());
        }

        let editing_disabled = ctx
            .annotation(feature_annotation(ctx.feature_type))
            .and_then(|a| a.text("editing"))
            .is_some_and(|e| e.eq_ignore_ascii_case("disabled"));
        if editing_disabled {
            ctx.holder
                .add(DisabledFacet::new("disabled", Precedence::Explicit));
        }
        Ok(())
    }
}

/// Properties and collections of an immutable type are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImmutablePropagationFacetFactory;

impl FacetFactory for ImmutablePropagationFacetFactory {
    fn name(&self) -> &'static str {
        "immutable_propagation"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::PROPERTIES_AND_COLLECTIONS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        if ctx.object_facets.contains(FacetKind::Immutable) {
            ctx.holder
                .add(DisabledFacet::new(IMMUTABLE_REASON, Precedence::High));
        }
        Ok(())
    }
}

/// `@MemberOrder(sequence)`: numeric or dewey text (`"1.2"`).
#[derive(Debug, Clone, Copy, Default)]
pub struct MemberOrderAnnotationFacetFactory;

impl FacetFactory for MemberOrderAnnotationFacetFactory {
    fn name(&self) -> &'static str {
        "member_order_annotation"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::MEMBERS
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        let sequence = ctx
            .annotation("MemberOrder")
            .and_then(|a| a.attributes.get("sequence"))
            .and_then(|v| match v {
                AnnotationValue::Text(s) => Some(s.trim().to_string()),
                AnnotationValue::Int(n) => Some(n.to_string()),
                AnnotationValue::Bool(_) => None,
            })
            .filter(|s| !s.is_empty());
        ctx.holder
            .add_optional(sequence.map(|s| MemberOrderFacet::new(s, Precedence::Explicit)));
        Ok(())
    }
}
