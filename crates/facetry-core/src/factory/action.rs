//! Action factories.

use super::{FacetFactory, MemberContext, feature_annotation};
use crate::facet::{
    ActionInvocationFacet, ActionSemantics, ActionSemanticsFacet, FacetKind, MarkerFacet,
    Precedence,
};
use crate::{FeatureType, MetamodelError};

/// How an action is invoked: its method and declared return type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionInvocationFacetFactory;

impl FacetFactory for ActionInvocationFacetFactory {
    fn name(&self) -> &'static str {
        "action_invocation"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::ACTIONS_ONLY
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        ctx.holder.add(ActionInvocationFacet::new(
            ctx.method.name.as_str(),
            ctx.method.returns.clone(),
            Precedence::Inferred,
        ));
        Ok(())
    }
}

/// Actions are non-idempotent unless `@Action(semantics = ..)` says otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionSemanticsFacetFactory;

impl FacetFactory for ActionSemanticsFacetFactory {
    fn name(&self) -> &'static str {
        "action_semantics"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::ACTIONS_ONLY
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        ctx.holder.add(ActionSemanticsFacet::new(
            ActionSemantics::NonIdempotent,
            Precedence::Default,
        ));

        let declared = ctx
            .annotation(feature_annotation(FeatureType::Action))
            .and_then(|a| a.text("semantics"));
        if let Some(text) = declared {
            let semantics =
                ActionSemantics::parse(text).ok_or_else(|| MetamodelError::FactoryFailed {
                    factory: self.name(),
                    identifier: ctx.identifier.clone(),
                    reason: format!("unknown action semantics '{text}'"),
                })?;
            ctx.holder
                .add(ActionSemanticsFacet::new(semantics, Precedence::Explicit));
        }
        Ok(())
    }
}

/// `@HomePage` marks the action that produces the application's home page.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomePageAnnotationFacetFactory;

impl FacetFactory for HomePageAnnotationFacetFactory {
    fn name(&self) -> &'static str {
        "home_page_annotation"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::ACTIONS_ONLY
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        if ctx.method.has_annotation("HomePage") {
            ctx.holder
                .add(MarkerFacet::new(FacetKind::HomePage, Precedence::Explicit));
        }
        Ok(())
    }
}
