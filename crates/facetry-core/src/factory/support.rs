//! Convention-named support methods (`hideName`, `choices0PlaceOrder`, ...).

use super::{FacetFactory, MemberContext, ParameterContext};
use crate::facet::{FacetKind, Precedence, SupportMethodFacet};
use crate::primitives::{
    AUTO_COMPLETE_PREFIX, CHOICES_PREFIX, DEFAULT_PREFIX, DISABLE_PREFIX, HIDE_PREFIX,
    VALIDATE_PREFIX,
};
use crate::{FeatureType, MetamodelError, capitalize};

/// Name of the support method for a member: `hide` + `name` → `hideName`.
#[must_use]
pub fn support_method(prefix: &str, member_id: &str) -> String {
    format!("{prefix}{}", capitalize(member_id))
}

/// Name of the positional support method for a parameter:
/// `choices`, 0, `placeOrder` → `choices0PlaceOrder`.
#[must_use]
pub fn parameter_support_method(prefix: &str, index: usize, action: &str) -> String {
    format!("{prefix}{index}{}", capitalize(action))
}

const MEMBERS_AND_PARAMETERS: &[FeatureType] = &[
    FeatureType::Property,
    FeatureType::Collection,
    FeatureType::Action,
    FeatureType::ActionParameter,
];

/// One factory per support prefix.
///
/// Consumes the matching support method and records it as a `High` facet of
/// the configured kind. Absence of the method is not an error.
#[derive(Debug, Clone)]
pub struct SupportMethodFacetFactory {
    name: &'static str,
    prefix: &'static str,
    kind: FacetKind,
    feature_types: &'static [FeatureType],
}

impl SupportMethodFacetFactory {
    /// Create a support-method factory.
    #[must_use]
    pub fn new(
        name: &'static str,
        prefix: &'static str,
        kind: FacetKind,
        feature_types: &'static [FeatureType],
    ) -> Self {
        Self {
            name,
            prefix,
            kind,
            feature_types,
        }
    }

    /// The standard support-method factories, in pipeline order.
    #[must_use]
    pub fn standard() -> Vec<Self> {
        vec![
            Self::new("hide_method", HIDE_PREFIX, FacetKind::HideMethod, FeatureType::MEMBERS),
            Self::new(
                "disable_method",
                DISABLE_PREFIX,
                FacetKind::DisableMethod,
                FeatureType::MEMBERS,
            ),
            Self::new(
                "validate_method",
                VALIDATE_PREFIX,
                FacetKind::ValidateMethod,
                MEMBERS_AND_PARAMETERS,
            ),
            Self::new(
                "choices_method",
                CHOICES_PREFIX,
                FacetKind::ChoicesMethod,
                FeatureType::PROPERTIES_AND_PARAMETERS,
            ),
            Self::new(
                "default_method",
                DEFAULT_PREFIX,
                FacetKind::DefaultMethod,
                FeatureType::PROPERTIES_AND_PARAMETERS,
            ),
            Self::new(
                "auto_complete_method",
                AUTO_COMPLETE_PREFIX,
                FacetKind::AutoCompleteMethod,
                FeatureType::PROPERTIES_AND_PARAMETERS,
            ),
        ]
    }
}

impl FacetFactory for SupportMethodFacetFactory {
    fn name(&self) -> &'static str {
        self.name
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        self.feature_types
    }

    fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
        let method = support_method(self.prefix, ctx.member_id);
        if let Some(found) = ctx.methods.remove_named(&method) {
            ctx.holder
                .add(SupportMethodFacet::new(self.kind, found.name, Precedence::High));
        }
        Ok(())
    }

    fn process_parameter(&self, ctx: &mut ParameterContext<'_>) -> Result<(), MetamodelError> {
        let method = parameter_support_method(self.prefix, ctx.index, &ctx.action.name);
        if let Some(found) = ctx.methods.remove_named(&method) {
            ctx.holder
                .add(SupportMethodFacet::new(self.kind, found.name, Precedence::High));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn support_method_names() {
        assert_eq!(support_method("hide", "name"), "hideName");
        assert_eq!(support_method("disable", "placeOrder"), "disablePlaceOrder");
        assert_eq!(
            parameter_support_method("choices", 0, "placeOrder"),
            "choices0PlaceOrder"
        );
    }

    #[test]
    fn standard_factories_have_distinct_names() {
        let factories = SupportMethodFacetFactory::standard();
        let mut names: Vec<_> = factories.iter().map(|f| f.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), factories.len());
    }
}
