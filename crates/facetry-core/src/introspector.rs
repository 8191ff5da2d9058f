//! # Introspection
//!
//! Assembles the body of one `ObjectSpecification` from a `ClassDescriptor`:
//!
//! 1. collect public instance methods, inherited ones included
//! 2. run the object factories
//! 3. discover accessors (properties, collections) and run their factories
//! 4. discover actions and run their factories, then each parameter's
//! 5. record reserved-prefix methods nothing consumed as rejected
//! 6. load referenced types (when configured)
//! 7. order members and derive the specialization
//!
//! Runs on the loader's introspecting thread only.

use crate::facet::{FacetHolder, FacetKind, MemberOrderFacet};
use crate::factory::{ClassContext, MemberContext, MethodRemover, ParameterContext};
use crate::loader::SpecificationLoader;
use crate::primitives::{self, GET_PREFIX, IS_PREFIX, MAX_ACTION_PARAMETERS, MAX_SUPERTYPE_DEPTH};
use crate::reflect::{ClassDescriptor, MethodDescriptor};
use crate::specification::{
    ObjectMember, ParameterSpec, RejectedMethod, Specialization, SpecificationBody,
};
use crate::{FeatureType, Identifier, MetamodelError, TypeRef, bean_name};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Build the specification body of `class`.
pub(crate) fn introspect(
    loader: &SpecificationLoader,
    class: &ClassDescriptor,
) -> Result<SpecificationBody, MetamodelError> {
    let identifier = Identifier::class(class.name.as_str())?;
    let pipeline = loader.pipeline();
    let config = loader.config();

    let mut methods = MethodRemover::new(collect_methods(loader, class)?);
    let mut facets = FacetHolder::new();

    pipeline.process_class(&mut ClassContext {
        class,
        identifier: &identifier,
        holder: &mut facets,
        methods: &mut methods,
        loader,
    })?;

    let mut members = Vec::new();

    // Accessors
    let accessors: Vec<MethodDescriptor> = methods
        .remaining()
        .iter()
        .filter(|m| is_accessor(m))
        .cloned()
        .collect();
    for accessor in &accessors {
        methods.remove_method(accessor);
    }
    for accessor in &accessors {
        let feature_type = if accessor.returns.is_collection() {
            FeatureType::Collection
        } else {
            FeatureType::Property
        };
        let id = bean_name(&accessor.name)?;
        let member_identifier = Identifier::property_or_collection(class.name.as_str(), id.as_str())?;
        let mut holder = FacetHolder::new();
        pipeline.process_member(&mut MemberContext {
            class,
            feature_type,
            method: accessor,
            identifier: &member_identifier,
            member_id: &id,
            object_facets: &facets,
            holder: &mut holder,
            methods: &mut methods,
            loader,
        })?;
        members.push(ObjectMember {
            feature_type,
            id,
            identifier: member_identifier,
            return_type: accessor.returns.clone(),
            facets: holder,
            parameters: Vec::new(),
        });
    }

    // Actions
    let actions: Vec<MethodDescriptor> = methods
        .remaining()
        .iter()
        .filter(|m| primitives::reserved_prefix_of(&m.name).is_none())
        .filter(|m| !config.actions_require_annotation || m.has_annotation("Action"))
        .cloned()
        .collect();
    for action in &actions {
        methods.remove_method(action);
    }
    for action in &actions {
        let parameter_types = action.parameter_types();
        let action_identifier =
            Identifier::action(class.name.as_str(), action.name.as_str(), &parameter_types)?;
        if action.parameters.len() > MAX_ACTION_PARAMETERS {
            return Err(MetamodelError::InvalidIdentifier(format!(
                "{} declares {} parameters (max {})",
                action_identifier,
                action.parameters.len(),
                MAX_ACTION_PARAMETERS
            )));
        }

        let mut holder = FacetHolder::new();
        pipeline.process_member(&mut MemberContext {
            class,
            feature_type: FeatureType::Action,
            method: action,
            identifier: &action_identifier,
            member_id: &action.name,
            object_facets: &facets,
            holder: &mut holder,
            methods: &mut methods,
            loader,
        })?;

        let mut parameters = Vec::with_capacity(action.parameters.len());
        for (index, param) in action.parameters.iter().enumerate() {
            let mut param_holder = FacetHolder::new();
            pipeline.process_parameter(&mut ParameterContext {
                class,
                action,
                identifier: &action_identifier,
                index,
                param,
                holder: &mut param_holder,
                methods: &mut methods,
                loader,
            })?;
            parameters.push(ParameterSpec {
                index,
                type_ref: param.type_ref.clone(),
                name: param.name.clone(),
                facets: param_holder,
            });
        }

        members.push(ObjectMember {
            feature_type: FeatureType::Action,
            id: action.name.clone(),
            identifier: action_identifier,
            return_type: action.returns.clone(),
            facets: holder,
            parameters,
        });
    }

    // Leftovers
    let mut rejected = Vec::new();
    for method in methods.remaining() {
        if let Some(prefix) = primitives::reserved_prefix_of(&method.name) {
            rejected.push(RejectedMethod {
                identifier: Identifier::action(
                    class.name.as_str(),
                    method.name.as_str(),
                    &method.parameter_types(),
                )?,
                method: method.name.clone(),
                prefix,
            });
        }
    }
    if !rejected.is_empty() {
        tracing::debug!(class = %identifier, count = rejected.len(), "reserved-prefix methods rejected");
    }

    if config.resolve_member_types {
        for referenced in referenced_types(class, &members) {
            loader.load(&referenced)?;
        }
    }

    order_members(&mut members);
    let specialization = Specialization::derive(&facets);

    Ok(SpecificationBody {
        facets,
        members,
        specialization,
        superclass: class.superclass.clone(),
        interfaces: class.interfaces.clone(),
        rejected,
    })
}

/// Public instance methods of `class` and its super-types, subclass
/// declarations first. A super declaration with the signature of an already
/// collected one is shadowed.
fn collect_methods(
    loader: &SpecificationLoader,
    class: &ClassDescriptor,
) -> Result<Vec<MethodDescriptor>, MetamodelError> {
    let mut signatures = BTreeSet::new();
    let mut methods = Vec::new();
    let mut visited = BTreeSet::new();

    let mut current = Some(class.clone());
    let mut depth = 0;
    while let Some(descriptor) = current {
        if !visited.insert(descriptor.name.clone()) {
            tracing::warn!(class = %class.name, at = %descriptor.name, "cyclic super-type chain");
            break;
        }
        if depth > MAX_SUPERTYPE_DEPTH {
            tracing::warn!(class = %class.name, "super-type chain exceeds maximum depth");
            break;
        }

        for method in &descriptor.methods {
            if method.is_static || !method.public {
                continue;
            }
            if signatures.insert(method.signature()) {
                methods.push(method.clone());
            }
        }

        current = match &descriptor.superclass {
            Some(parent) => Some(loader.source().describe(parent)?),
            None => None,
        };
        depth += 1;
    }

    Ok(methods)
}

/// `getXxx()` (non-void) or `isXxx()` returning `bool`.
pub(crate) fn is_accessor(method: &MethodDescriptor) -> bool {
    if !method.parameters.is_empty() || method.returns.is_void() {
        return false;
    }
    primitives::has_convention_prefix(&method.name, GET_PREFIX)
        || (primitives::has_convention_prefix(&method.name, IS_PREFIX)
            && method.returns.is_boolean())
}

/// Every type name `class` refers to, deduplicated and sorted.
fn referenced_types(class: &ClassDescriptor, members: &[ObjectMember]) -> BTreeSet<String> {
    let mut types = BTreeSet::new();
    let mut add = |type_ref: &TypeRef| {
        types.insert(type_ref.type_name().to_string());
        if let Some(element) = type_ref.element_type() {
            types.insert(element.to_string());
        }
    };

    for member in members {
        add(&member.return_type);
        for param in &member.parameters {
            add(&param.type_ref);
        }
    }

    types.extend(class.superclass.iter().cloned());
    types.extend(class.interfaces.iter().cloned());
    for member in members {
        if let Some(element) = member.element_type() {
            types.insert(element.to_string());
        }
    }
    types
}

/// Members with a `MemberOrder` first, in dewey order; the rest keep their
/// discovery order.
fn order_members(members: &mut [ObjectMember]) {
    members.sort_by(|a, b| match (sequence(a), sequence(b)) {
        (Some(x), Some(y)) => MemberOrderFacet::compare(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

fn sequence(member: &ObjectMember) -> Option<&str> {
    member
        .facets
        .get_as::<MemberOrderFacet>(FacetKind::MemberOrder)
        .map(MemberOrderFacet::sequence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::ParamDescriptor;

    #[test]
    fn accessor_detection() {
        assert!(is_accessor(&MethodDescriptor::new("getName", TypeRef::named("string"))));
        assert!(is_accessor(&MethodDescriptor::new("isActive", TypeRef::named("bool"))));
        assert!(!is_accessor(&MethodDescriptor::new("isActive", TypeRef::named("string"))));
        assert!(!is_accessor(&MethodDescriptor::new("getName", TypeRef::Void)));
        assert!(!is_accessor(&MethodDescriptor::new("getaway", TypeRef::named("string"))));
        assert!(!is_accessor(
            &MethodDescriptor::new("getName", TypeRef::named("string"))
                .with_param(ParamDescriptor::new(TypeRef::named("int")))
        ));
    }

    #[test]
    fn referenced_types_include_elements_and_supertypes() {
        let class = ClassDescriptor::new("Customer").extending("Party");
        let members = vec![ObjectMember {
            feature_type: FeatureType::Collection,
            id: "orders".to_string(),
            identifier: Identifier::property_or_collection("Customer", "orders").expect("id"),
            return_type: TypeRef::collection("list", "Order"),
            facets: FacetHolder::new(),
            parameters: Vec::new(),
        }];
        let types: Vec<_> = referenced_types(&class, &members).into_iter().collect();
        assert_eq!(types, vec!["Order", "Party", "list"]);
    }
}
