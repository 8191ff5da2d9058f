//! The standard validators.

use super::{Element, MetamodelValidator, ValidationFailures, ValidationPass};
use crate::facet::{FacetConflict, FacetKind};
use crate::{FeatureType, Identifier};
use std::collections::BTreeMap;

/// Stateless pass driven by a plain function.
struct FnPass(fn(Element<'_>, &mut ValidationFailures));

impl ValidationPass for FnPass {
    fn visit(&mut self, element: Element<'_>, failures: &mut ValidationFailures) {
        (self.0)(element, failures);
    }
}

// =============================================================================
// OBJECT VALIDATORS
// =============================================================================

/// Placeholders that never completed.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncompleteSpecificationValidator;

impl MetamodelValidator for IncompleteSpecificationValidator {
    fn name(&self) -> &'static str {
        "incomplete_specification"
    }

    fn feature_type(&self) -> FeatureType {
        FeatureType::Object
    }

    fn begin(&self) -> Box<dyn ValidationPass> {
        Box::new(FnPass(|element, failures| {
            if let Element::Object(spec) = element {
                if !spec.is_complete() {
                    failures.add(spec.identifier().clone(), "specification never completed");
                }
            }
        }))
    }
}

/// Reserved-prefix methods that support no member.
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectedMethodValidator;

impl MetamodelValidator for RejectedMethodValidator {
    fn name(&self) -> &'static str {
        "rejected_method"
    }

    fn feature_type(&self) -> FeatureType {
        FeatureType::Object
    }

    fn begin(&self) -> Box<dyn ValidationPass> {
        Box::new(FnPass(|element, failures| {
            let Element::Object(spec) = element else {
                return;
            };
            for rejected in spec.rejected_methods() {
                failures.add(
                    rejected.identifier.clone(),
                    format!(
                        "method '{}' uses reserved prefix '{}' but supports no member",
                        rejected.method, rejected.prefix
                    ),
                );
            }
        }))
    }
}

/// Two members of one type sharing an id.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateMemberValidator;

impl MetamodelValidator for DuplicateMemberValidator {
    fn name(&self) -> &'static str {
        "duplicate_member"
    }

    fn feature_type(&self) -> FeatureType {
        FeatureType::Object
    }

    fn begin(&self) -> Box<dyn ValidationPass> {
        Box::new(FnPass(|element, failures| {
            let Element::Object(spec) = element else {
                return;
            };
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for member in spec.members() {
                *counts.entry(member.id.as_str()).or_default() += 1;
            }
            for member in spec.members() {
                let count = counts.get(member.id.as_str()).copied().unwrap_or(0);
                if count > 1 {
                    failures.add(
                        member.identifier.clone(),
                        format!("member id '{}' is declared {} times", member.id, count),
                    );
                }
            }
        }))
    }
}

/// Equal-precedence facets that disagree, on any holder of a type.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacetConflictValidator;

impl FacetConflictValidator {
    fn report(
        identifier: &Identifier,
        scope: &str,
        conflicts: &[FacetConflict],
        failures: &mut ValidationFailures,
    ) {
        for conflict in conflicts {
            failures.add(
                identifier.clone(),
                format!(
                    "{scope}conflicting {} facets at {} precedence: [{}] replaced by [{}]",
                    conflict.kind, conflict.precedence, conflict.displaced, conflict.winner
                ),
            );
        }
    }
}

impl MetamodelValidator for FacetConflictValidator {
    fn name(&self) -> &'static str {
        "facet_conflict"
    }

    fn feature_type(&self) -> FeatureType {
        FeatureType::Object
    }

    fn begin(&self) -> Box<dyn ValidationPass> {
        Box::new(FnPass(|element, failures| {
            let Element::Object(spec) = element else {
                return;
            };
            Self::report(spec.identifier(), "", spec.facets().conflicts(), failures);
            for member in spec.members() {
                Self::report(&member.identifier, "", member.facets.conflicts(), failures);
                for param in &member.parameters {
                    let scope = format!("parameter {}: ", param.index);
                    Self::report(&member.identifier, &scope, param.facets.conflicts(), failures);
                }
            }
        }))
    }
}

/// Mutually exclusive type-level specializations.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecializationConflictValidator;

const EXCLUSIVE_KINDS: &[FacetKind] = &[
    FacetKind::CollectionType,
    FacetKind::ValueSemantics,
    FacetKind::DomainService,
    FacetKind::ViewModel,
    FacetKind::Entity,
];

impl MetamodelValidator for SpecializationConflictValidator {
    fn name(&self) -> &'static str {
        "specialization_conflict"
    }

    fn feature_type(&self) -> FeatureType {
        FeatureType::Object
    }

    fn begin(&self) -> Box<dyn ValidationPass> {
        Box::new(FnPass(|element, failures| {
            let Element::Object(spec) = element else {
                return;
            };
            let present: Vec<&str> = EXCLUSIVE_KINDS
                .iter()
                .filter(|k| spec.facets().contains(**k))
                .map(|k| k.name())
                .collect();
            if present.len() > 1 {
                failures.add(
                    spec.identifier().clone(),
                    format!("mutually exclusive specializations: {}", present.join(", ")),
                );
            }
        }))
    }
}

// =============================================================================
// MEMBER VALIDATORS
// =============================================================================

/// At most one home-page action across the whole model.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniqueHomePageValidator;

#[derive(Default)]
struct HomePagePass {
    found: Vec<Identifier>,
}

impl ValidationPass for HomePagePass {
    fn visit(&mut self, element: Element<'_>, _failures: &mut ValidationFailures) {
        if let Element::Member(_, member) = element {
            if member.facets.contains(FacetKind::HomePage) {
                self.found.push(member.identifier.clone());
            }
        }
    }

    fn finish(&mut self, failures: &mut ValidationFailures) {
        if self.found.len() < 2 {
            return;
        }
        let all: Vec<String> = self.found.iter().map(ToString::to_string).collect();
        for identifier in &self.found {
            failures.add(
                identifier.clone(),
                format!("more than one home page action: {}", all.join(", ")),
            );
        }
    }
}

impl MetamodelValidator for UniqueHomePageValidator {
    fn name(&self) -> &'static str {
        "unique_home_page"
    }

    fn feature_type(&self) -> FeatureType {
        FeatureType::Action
    }

    fn begin(&self) -> Box<dyn ValidationPass> {
        Box::new(HomePagePass::default())
    }
}

/// Choices and auto-complete supplied for the same property or parameter.
#[derive(Debug, Clone, Copy)]
pub struct ChoicesAutoCompleteValidator {
    feature_type: FeatureType,
}

impl ChoicesAutoCompleteValidator {
    /// Check properties or action parameters.
    #[must_use]
    pub fn new(feature_type: FeatureType) -> Self {
        Self { feature_type }
    }
}

impl MetamodelValidator for ChoicesAutoCompleteValidator {
    fn name(&self) -> &'static str {
        "choices_auto_complete"
    }

    fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    fn begin(&self) -> Box<dyn ValidationPass> {
        Box::new(FnPass(|element, failures| {
            let both = |facets: &crate::facet::FacetHolder| {
                facets.contains(FacetKind::ChoicesMethod)
                    && facets.contains(FacetKind::AutoCompleteMethod)
            };
            match element {
                Element::Member(_, member) if both(&member.facets) => {
                    failures.add(
                        member.identifier.clone(),
                        "has both choices and auto-complete",
                    );
                }
                Element::Parameter(_, action, param) if both(&param.facets) => {
                    failures.add(
                        action.identifier.clone(),
                        format!("parameter {} has both choices and auto-complete", param.index),
                    );
                }
                _ => {}
            }
        }))
    }
}

/// Collections must declare their element type.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionElementTypeValidator;

impl MetamodelValidator for CollectionElementTypeValidator {
    fn name(&self) -> &'static str {
        "collection_element_type"
    }

    fn feature_type(&self) -> FeatureType {
        FeatureType::Collection
    }

    fn begin(&self) -> Box<dyn ValidationPass> {
        Box::new(FnPass(|element, failures| {
            if let Element::Member(_, member) = element {
                if member.element_type().is_none() {
                    failures.add(
                        member.identifier.clone(),
                        "collection does not declare its element type",
                    );
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::{MaxLengthFacet, Precedence};
    use crate::factory::{FacetFactory, FacetFactoryPipeline, MemberContext};
    use crate::specification::ObjectSpecification;
    use crate::validation::ValidationEngine;
    use crate::{
        Annotation, ClassDescriptor, MetamodelError, MethodDescriptor, ReflectorConfig,
        SpecificationLoader, TypeCatalog, TypeRef,
    };
    use std::sync::Arc;

    fn run(
        validator: impl MetamodelValidator + 'static,
        specs: &[Arc<ObjectSpecification>],
    ) -> ValidationFailures {
        let mut engine = ValidationEngine::new();
        engine.register(validator);
        engine.validate(specs)
    }

    fn load_with(
        pipeline: Option<FacetFactoryPipeline>,
        class: ClassDescriptor,
    ) -> Vec<Arc<ObjectSpecification>> {
        let name = class.name.clone();
        let catalog = TypeCatalog::from_descriptors(vec![class]).expect("catalog");
        let config = ReflectorConfig::default();
        let pipeline = pipeline.unwrap_or_else(|| FacetFactoryPipeline::standard(&config));
        let loader = SpecificationLoader::with_pipeline(catalog, pipeline, config);
        loader.load(&name).expect("load");
        loader.all_specifications()
    }

    fn load(class: ClassDescriptor) -> Vec<Arc<ObjectSpecification>> {
        load_with(None, class)
    }

    fn member_id(class: &str, member: &str) -> Identifier {
        Identifier::property_or_collection(class, member).expect("id")
    }

    fn identifiers(failures: &ValidationFailures) -> Vec<Identifier> {
        failures.iter().map(|f| f.identifier.clone()).collect()
    }

    /// Adds two explicit max lengths to `name`.
    struct TwoLimits(usize, usize);

    impl FacetFactory for TwoLimits {
        fn name(&self) -> &'static str {
            "two_limits"
        }

        fn feature_types(&self) -> &'static [FeatureType] {
            FeatureType::PROPERTIES_ONLY
        }

        fn process_member(&self, ctx: &mut MemberContext<'_>) -> Result<(), MetamodelError> {
            ctx.holder.add(MaxLengthFacet::new(self.0, Precedence::Explicit));
            ctx.holder.add(MaxLengthFacet::new(self.1, Precedence::Explicit));
            Ok(())
        }
    }

    fn named_customer() -> ClassDescriptor {
        ClassDescriptor::new("Customer")
            .with_method(MethodDescriptor::new("getName", TypeRef::named("string")))
    }

    fn limits_pipeline(first: usize, second: usize) -> FacetFactoryPipeline {
        FacetFactoryPipeline::standard(&ReflectorConfig::default())
            .with_factory(TwoLimits(first, second))
    }

    #[test]
    fn facet_conflict_reported_on_member() {
        let specs = load_with(Some(limits_pipeline(10, 20)), named_customer());
        let failures = run(FacetConflictValidator, &specs);

        assert_eq!(identifiers(&failures), vec![member_id("Customer", "name")]);
        assert!(failures.messages()[0].contains("max_length"));
    }

    #[test]
    fn agreeing_facets_are_not_a_conflict() {
        let specs = load_with(Some(limits_pipeline(10, 10)), named_customer());
        assert!(run(FacetConflictValidator, &specs).is_empty());
    }

    #[test]
    fn value_entity_is_a_specialization_conflict() {
        let class = ClassDescriptor::new("Money")
            .with_annotation(Annotation::new("Value"))
            .with_annotation(Annotation::new("Entity"));
        let failures = run(SpecializationConflictValidator, &load(class));

        assert_eq!(
            identifiers(&failures),
            vec![Identifier::class("Money").expect("id")]
        );
        assert!(failures.messages()[0].contains("value_semantics"));
    }

    #[test]
    fn single_specialization_is_fine() {
        let class = ClassDescriptor::new("Customer").with_annotation(Annotation::new("Entity"));
        assert!(run(SpecializationConflictValidator, &load(class)).is_empty());
    }

    #[test]
    fn placeholder_is_incomplete() {
        let placeholder = Arc::new(ObjectSpecification::placeholder("Pending").expect("spec"));
        let failures = run(IncompleteSpecificationValidator, &[placeholder]);

        assert_eq!(
            identifiers(&failures),
            vec![Identifier::class("Pending").expect("id")]
        );
        assert!(run(IncompleteSpecificationValidator, &load(named_customer())).is_empty());
    }

    #[test]
    fn choices_and_auto_complete_together() {
        let options = || TypeRef::collection("list", "string");
        let ticket = || {
            ClassDescriptor::new("Ticket")
                .with_method(MethodDescriptor::new("getStatus", TypeRef::named("string")))
                .with_method(MethodDescriptor::new("choicesStatus", options()))
        };
        let with_both =
            ticket().with_method(MethodDescriptor::new("autoCompleteStatus", options()));
        let failures = run(
            ChoicesAutoCompleteValidator::new(FeatureType::Property),
            &load(with_both),
        );
        assert_eq!(identifiers(&failures), vec![member_id("Ticket", "status")]);

        let failures = run(
            ChoicesAutoCompleteValidator::new(FeatureType::Property),
            &load(ticket()),
        );
        assert!(failures.is_empty());
    }

    #[test]
    fn raw_collection_lacks_element_type() {
        let raw = ClassDescriptor::new("Basket")
            .with_method(MethodDescriptor::new("getItems", TypeRef::named("list")));
        let failures = run(CollectionElementTypeValidator, &load(raw));
        assert_eq!(identifiers(&failures), vec![member_id("Basket", "items")]);

        let declared = ClassDescriptor::new("Basket").with_method(
            MethodDescriptor::new("getItems", TypeRef::named("list"))
                .with_annotation(Annotation::new("Collection").with_text("typeOf", "string")),
        );
        assert!(run(CollectionElementTypeValidator, &load(declared)).is_empty());

        let generic = ClassDescriptor::new("Basket").with_method(MethodDescriptor::new(
            "getItems",
            TypeRef::collection("list", "string"),
        ));
        assert!(run(CollectionElementTypeValidator, &load(generic)).is_empty());
    }
}
