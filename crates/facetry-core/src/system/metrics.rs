//! Model metrics: counts over a set of specifications.

use crate::facet::{FacetHolder, FacetKind};
use crate::specification::{ObjectSpecification, Specialization};
use crate::FeatureType;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Counts describing a metamodel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModelMetrics {
    /// Total number of cached specifications.
    pub specification_count: usize,
    /// Specifications still under construction.
    pub placeholder_count: usize,
    /// Completed specifications per specialization.
    pub by_specialization: BTreeMap<Specialization, usize>,
    /// Number of properties across all types.
    pub property_count: usize,
    /// Number of collections across all types.
    pub collection_count: usize,
    /// Number of actions across all types.
    pub action_count: usize,
    /// Number of action parameters across all types.
    pub parameter_count: usize,
    /// Active facets on every holder (types, members, parameters).
    pub facet_count: usize,
    /// Active facets per kind.
    pub facets_by_kind: BTreeMap<FacetKind, usize>,
    /// Methods rejected for carrying an unconsumed reserved prefix.
    pub rejected_method_count: usize,
}

impl ModelMetrics {
    /// Create new metrics with all zeros.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compute metrics from a set of specifications.
    #[must_use]
    pub fn from_specifications(specs: &[Arc<ObjectSpecification>]) -> Self {
        let mut metrics = Self::empty();
        for spec in specs {
            metrics.specification_count += 1;
            let Some(specialization) = spec.specialization() else {
                metrics.placeholder_count += 1;
                continue;
            };
            *metrics.by_specialization.entry(specialization).or_default() += 1;
            metrics.rejected_method_count += spec.rejected_methods().len();
            metrics.count_facets(spec.facets());

            for member in spec.members() {
                match member.feature_type {
                    FeatureType::Property => metrics.property_count += 1,
                    FeatureType::Collection => metrics.collection_count += 1,
                    _ => metrics.action_count += 1,
                }
                metrics.count_facets(&member.facets);
                for param in &member.parameters {
                    metrics.parameter_count += 1;
                    metrics.count_facets(&param.facets);
                }
            }
        }
        metrics
    }

    /// Number of members of any kind.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.property_count + self.collection_count + self.action_count
    }

    fn count_facets(&mut self, holder: &FacetHolder) {
        for facet in holder.iter() {
            self.facet_count += 1;
            *self.facets_by_kind.entry(facet.kind()).or_default() += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReflectorConfig;
    use crate::loader::SpecificationLoader;
    use crate::reflect::{ClassDescriptor, MethodDescriptor, ParamDescriptor, TypeCatalog};
    use crate::TypeRef;

    #[test]
    fn empty_model_has_zero_metrics() {
        assert_eq!(ModelMetrics::from_specifications(&[]), ModelMetrics::empty());
    }

    #[test]
    fn counts_members_by_kind() {
        let order = ClassDescriptor::new("Order")
            .with_method(MethodDescriptor::new("getTotal", TypeRef::named("int")))
            .with_method(MethodDescriptor::new("getLines", TypeRef::collection("list", "string")))
            .with_method(
                MethodDescriptor::new("ship", TypeRef::Void)
                    .with_param(ParamDescriptor::new(TypeRef::named("string")).named("carrier")),
            );
        let catalog = TypeCatalog::from_descriptors([order]).expect("catalog");
        let loader = SpecificationLoader::new(catalog, ReflectorConfig::default());
        loader.load("Order").expect("load");

        let metrics = ModelMetrics::from_specifications(&loader.all_specifications());
        assert_eq!(metrics.property_count, 1);
        assert_eq!(metrics.collection_count, 1);
        assert_eq!(metrics.action_count, 1);
        assert_eq!(metrics.parameter_count, 1);
        assert_eq!(metrics.member_count(), 3);
        assert_eq!(metrics.placeholder_count, 0);
        assert_eq!(metrics.by_specialization.get(&Specialization::Object), Some(&1));
        assert!(metrics.facets_by_kind.get(&FacetKind::Named).copied().unwrap_or(0) >= 3);
    }
}
