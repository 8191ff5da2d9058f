//! # Metamodel Context
//!
//! The lifecycle-scoped owner of the specification loader and the validators.
//!
//! There is no process-global metamodel: whoever needs one creates a context,
//! bootstraps it, shares it (it is `Send + Sync`), and tears it down.
//!
//! ## Bootstrap
//!
//! 1. Load every type the class source declares (referenced types follow).
//! 2. Run the validation pass over everything cached.
//! 3. Escalate failures to `MetamodelError::Validation` when
//!    `validation.fatal` is set; otherwise hand them back.

use crate::config::MetamodelConfig;
use crate::loader::SpecificationLoader;
use crate::reflect::ClassSource;
use crate::specification::ObjectSpecification;
use crate::validation::{ValidationEngine, ValidationFailures};
use crate::MetamodelError;
use std::sync::Arc;

/// An owned metamodel: loader, validators and configuration.
#[derive(Debug)]
pub struct MetamodelContext {
    loader: SpecificationLoader,
    validation: ValidationEngine,
    config: MetamodelConfig,
}

impl MetamodelContext {
    /// Create a context with the standard pipeline and validators.
    pub fn new(source: impl ClassSource + 'static, config: MetamodelConfig) -> Self {
        let loader = SpecificationLoader::new(source, config.reflector.clone());
        let validation = ValidationEngine::standard(&config.validation);
        Self::from_parts(loader, validation, config)
    }

    /// Assemble a context from a preconfigured loader and validation engine.
    #[must_use]
    pub fn from_parts(
        loader: SpecificationLoader,
        validation: ValidationEngine,
        config: MetamodelConfig,
    ) -> Self {
        Self {
            loader,
            validation,
            config,
        }
    }

    /// The specification loader.
    #[must_use]
    pub fn loader(&self) -> &SpecificationLoader {
        &self.loader
    }

    /// The validation engine.
    #[must_use]
    pub fn validation(&self) -> &ValidationEngine {
        &self.validation
    }

    /// The configuration this context was built with.
    #[must_use]
    pub fn config(&self) -> &MetamodelConfig {
        &self.config
    }

    /// Load every declared type and validate the result.
    ///
    /// Returns the (possibly empty) failures when validation is disabled or
    /// not fatal.
    pub fn bootstrap(&self) -> Result<ValidationFailures, MetamodelError> {
        let declared = self.loader.source().declared_types();
        tracing::info!(types = declared.len(), "bootstrapping metamodel");

        for type_name in &declared {
            self.loader.load(type_name)?;
        }

        if !self.config.validation.enabled {
            tracing::info!(specifications = self.loader.len(), "validation disabled");
            return Ok(ValidationFailures::new());
        }

        let failures = self.validate();
        if self.config.validation.fatal && !failures.is_empty() {
            for failure in &failures {
                tracing::warn!(%failure, "validation failure");
            }
            return Err(MetamodelError::Validation(failures));
        }
        Ok(failures)
    }

    /// Run the validation pass over everything currently cached.
    #[must_use]
    pub fn validate(&self) -> ValidationFailures {
        self.validation.validate(&self.loader.all_specifications())
    }

    /// Get (introspecting if needed) the specification of `type_name`.
    pub fn specification(&self, type_name: &str) -> Result<Arc<ObjectSpecification>, MetamodelError> {
        self.loader.load(type_name)
    }

    /// Every cached specification, ordered by type name.
    #[must_use]
    pub fn specifications(&self) -> Vec<Arc<ObjectSpecification>> {
        self.loader.all_specifications()
    }

    /// Release every cached specification.
    pub fn teardown(&self) {
        self.loader.clear();
        tracing::info!("metamodel torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{Annotation, ClassDescriptor, MethodDescriptor, TypeCatalog};
    use crate::TypeRef;

    fn home_page_catalog(count: usize) -> TypeCatalog {
        let types = (0..count).map(|i| {
            ClassDescriptor::new(format!("Dashboard{i}")).with_method(
                MethodDescriptor::new("open", TypeRef::named("string"))
                    .with_annotation(Annotation::new("HomePage")),
            )
        });
        TypeCatalog::from_descriptors(types).expect("catalog")
    }

    #[test]
    fn bootstrap_loads_declared_types() {
        let context = MetamodelContext::new(home_page_catalog(1), MetamodelConfig::default());
        let failures = context.bootstrap().expect("bootstrap");
        assert!(failures.is_empty());
        assert!(context.loader().lookup("Dashboard0").is_some());
        assert!(context.loader().lookup("string").is_some());
    }

    #[test]
    fn fatal_validation_aborts_bootstrap() {
        let context = MetamodelContext::new(home_page_catalog(2), MetamodelConfig::default());
        let error = context.bootstrap().expect_err("two home pages");
        assert!(matches!(error, MetamodelError::Validation(f) if f.len() == 2));
    }

    #[test]
    fn non_fatal_validation_returns_failures() {
        let mut config = MetamodelConfig::default();
        config.validation.fatal = false;
        let context = MetamodelContext::new(home_page_catalog(2), config);
        let failures = context.bootstrap().expect("non-fatal");
        assert_eq!(failures.len(), 2);
    }

    #[test]
    fn teardown_empties_the_cache() {
        let context = MetamodelContext::new(home_page_catalog(1), MetamodelConfig::default());
        context.bootstrap().expect("bootstrap");
        assert!(!context.specifications().is_empty());
        context.teardown();
        assert!(context.specifications().is_empty());
    }
}
