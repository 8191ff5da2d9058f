//! Type-level factories: ignored methods, structural kind, domain annotations, titles.

use super::{ClassContext, FacetFactory, feature_annotation};
use crate::facet::{
    FacetKind, MarkerFacet, NotInstantiable, NotInstantiableFacet, Precedence, TitleFacet,
    TitleSource,
};
use crate::introspector::is_accessor;
use crate::primitives::{IGNORED_METHODS, TITLE_METHOD};
use crate::reflect::TypeKind;
use crate::{FeatureType, MetamodelError, bean_name};

/// Removes methods that are never part of the metamodel: framework methods,
/// configured extras, and anything annotated `@Programmatic`.
#[derive(Debug, Clone, Default)]
pub struct IgnoredMethodsFacetFactory {
    extra: Vec<String>,
}

impl IgnoredMethodsFacetFactory {
    /// Ignore the framework methods plus `extra`.
    #[must_use]
    pub fn new(extra: Vec<String>) -> Self {
        Self { extra }
    }
}

impl FacetFactory for IgnoredMethodsFacetFactory {
    fn name(&self) -> &'static str {
        "ignored_methods"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::OBJECTS_ONLY
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) -> Result<(), MetamodelError> {
        let removed = ctx.methods.remove_where(|m| {
            IGNORED_METHODS.contains(&m.name.as_str())
                || self.extra.iter().any(|e| *e == m.name)
                || m.has_annotation("Programmatic")
        });
        if !removed.is_empty() {
            tracing::trace!(class = %ctx.identifier, count = removed.len(), "ignored methods removed");
        }
        Ok(())
    }
}

/// Facets implied by the structural kind of the type.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeKindFacetFactory;

impl FacetFactory for TypeKindFacetFactory {
    fn name(&self) -> &'static str {
        "type_kind"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::OBJECTS_ONLY
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) -> Result<(), MetamodelError> {
        let p = Precedence::Inferred;
        match ctx.class.kind {
            TypeKind::Class => {}
            TypeKind::Value => {
                ctx.holder.add(MarkerFacet::new(FacetKind::ValueSemantics, p));
            }
            TypeKind::Collection => {
                ctx.holder.add(MarkerFacet::new(FacetKind::CollectionType, p));
            }
            TypeKind::Void => {
                ctx.holder.add(NotInstantiableFacet::new(NotInstantiable::Void, p));
            }
            TypeKind::Abstract => {
                ctx.holder.add(NotInstantiableFacet::new(NotInstantiable::Abstract, p));
            }
            TypeKind::Interface => {
                ctx.holder.add(NotInstantiableFacet::new(NotInstantiable::Interface, p));
            }
        }
        Ok(())
    }
}

/// `@Entity`, `@ViewModel`, `@Value`, `@DomainService` and
/// `@DomainObject(nature = .., editing = ..)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomainObjectAnnotationFacetFactory;

impl DomainObjectAnnotationFacetFactory {
    fn nature_kind(nature: &str) -> Option<FacetKind> {
        match nature.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "entity" => Some(FacetKind::Entity),
            "view_model" | "viewmodel" => Some(FacetKind::ViewModel),
            "value" => Some(FacetKind::ValueSemantics),
            "service" | "domain_service" => Some(FacetKind::DomainService),
            _ => None,
        }
    }
}

impl FacetFactory for DomainObjectAnnotationFacetFactory {
    fn name(&self) -> &'static str {
        "domain_object_annotation"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::OBJECTS_ONLY
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) -> Result<(), MetamodelError> {
        let p = Precedence::Explicit;
        let markers = [
            ("Entity", FacetKind::Entity),
            ("ViewModel", FacetKind::ViewModel),
            ("Value", FacetKind::ValueSemantics),
            ("DomainService", FacetKind::DomainService),
        ];
        for (annotation, kind) in markers {
            if ctx.class.has_annotation(annotation) {
                ctx.holder.add(MarkerFacet::new(kind, p));
            }
        }

        let Some(domain_object) = ctx.class.annotation(feature_annotation(FeatureType::Object))
        else {
            return Ok(());
        };

        if let Some(nature) = domain_object.text("nature") {
            let kind = Self::nature_kind(nature).ok_or_else(|| MetamodelError::FactoryFailed {
                factory: self.name(),
                identifier: ctx.identifier.clone(),
                reason: format!("unknown domain object nature '{nature}'"),
            })?;
            ctx.holder.add(MarkerFacet::new(kind, p));
        }

        if domain_object
            .text("editing")
            .is_some_and(|e| e.eq_ignore_ascii_case("disabled"))
        {
            ctx.holder.add(MarkerFacet::new(FacetKind::Immutable, p));
        }
        Ok(())
    }
}

/// Consumes the `title()` method; collects `@Title` accessors otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleFacetFactory;

impl FacetFactory for TitleFacetFactory {
    fn name(&self) -> &'static str {
        "title"
    }

    fn feature_types(&self) -> &'static [FeatureType] {
        FeatureType::OBJECTS_ONLY
    }

    fn process_class(&self, ctx: &mut ClassContext<'_>) -> Result<(), MetamodelError> {
        let title_method = ctx
            .methods
            .find(TITLE_METHOD)
            .is_some_and(|m| m.parameters.is_empty() && !m.returns.is_void());
        if title_method {
            ctx.methods.remove_named(TITLE_METHOD);
            ctx.holder.add(TitleFacet::new(
                TitleSource::Method(TITLE_METHOD.to_string()),
                Precedence::High,
            ));
        }

        let mut properties = Vec::new();
        for method in ctx.methods.remaining() {
            if is_accessor(method) && method.has_annotation("Title") {
                properties.push(bean_name(&method.name)?);
            }
        }
        if !properties.is_empty() {
            ctx.holder
                .add(TitleFacet::new(TitleSource::Properties(properties), Precedence::Explicit));
        }
        Ok(())
    }
}
