//! # Specification Loader
//!
//! The identity-preserving cache of `ObjectSpecification`s.
//!
//! ## Cycle Safety
//!
//! The first request for a type inserts a placeholder into the cache *before*
//! the pipeline runs. Introspection may load other types (member, parameter
//! and super types); when that chain leads back to a type still under
//! construction, the nested request returns its placeholder instead of
//! recursing. The placeholder is the same `Arc` the caller later receives
//! completed.
//!
//! ## Concurrency
//!
//! Introspection is serialized by one loader-wide lock. The thread holding it
//! (the *introspector*) re-enters freely for nested loads; any other thread
//! asking for a type that is not complete yet blocks until the introspector is
//! done and then reuses its result. The pipeline never runs twice for one
//! type. Completed specifications are read without taking the lock.
//!
//! A failed introspection evicts its own placeholder and propagates the error.

use crate::config::ReflectorConfig;
use crate::factory::FacetFactoryPipeline;
use crate::introspector;
use crate::reflect::ClassSource;
use crate::specification::ObjectSpecification;
use crate::MetamodelError;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, ThreadId};

/// Loads, builds and caches specifications for the types of one class source.
pub struct SpecificationLoader {
    source: Box<dyn ClassSource>,
    pipeline: FacetFactoryPipeline,
    config: ReflectorConfig,
    cache: RwLock<BTreeMap<String, Arc<ObjectSpecification>>>,
    introspection: Mutex<()>,
    introspector: Mutex<Option<ThreadId>>,
}

/// Clears the introspector slot when the outermost load returns.
struct IntrospectorGuard<'a> {
    slot: &'a Mutex<Option<ThreadId>>,
}

impl Drop for IntrospectorGuard<'_> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
    }
}

impl SpecificationLoader {
    /// Create a loader running the standard pipeline.
    pub fn new(source: impl ClassSource + 'static, config: ReflectorConfig) -> Self {
        let pipeline = FacetFactoryPipeline::standard(&config);
        Self::with_pipeline(source, pipeline, config)
    }

    /// Create a loader running a custom pipeline.
    pub fn with_pipeline(
        source: impl ClassSource + 'static,
        pipeline: FacetFactoryPipeline,
        config: ReflectorConfig,
    ) -> Self {
        Self {
            source: Box::new(source),
            pipeline,
            config,
            cache: RwLock::new(BTreeMap::new()),
            introspection: Mutex::new(()),
            introspector: Mutex::new(None),
        }
    }

    /// The class source being introspected.
    #[must_use]
    pub fn source(&self) -> &dyn ClassSource {
        self.source.as_ref()
    }

    /// The factory pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &FacetFactoryPipeline {
        &self.pipeline
    }

    /// Reflector settings.
    #[must_use]
    pub fn config(&self) -> &ReflectorConfig {
        &self.config
    }

    /// Get the specification of `type_name`, introspecting it on first request.
    ///
    /// On the introspecting thread a type under construction is returned as
    /// its placeholder.
    pub fn load(&self, type_name: &str) -> Result<Arc<ObjectSpecification>, MetamodelError> {
        let cached = self.cached(type_name)?;
        if let Some(spec) = cached.as_ref().filter(|s| s.is_complete()) {
            tracing::trace!(type_name, "specification cache hit");
            return Ok(Arc::clone(spec));
        }

        if self.is_introspector()? {
            return match cached {
                Some(placeholder) => {
                    tracing::trace!(type_name, "placeholder returned to introspector");
                    Ok(placeholder)
                }
                None => self.introspect(type_name),
            };
        }

        let _lock = self
            .introspection
            .lock()
            .map_err(|_| MetamodelError::LockPoisoned("introspection"))?;
        let _guard = self.claim_introspector()?;

        // Another thread may have finished it while this one waited.
        if let Some(spec) = self.cached(type_name)? {
            return Ok(spec);
        }
        self.introspect(type_name)
    }

    /// Cache-only lookup. Never introspects.
    #[must_use]
    pub fn lookup(&self, type_name: &str) -> Option<Arc<ObjectSpecification>> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        cache.get(type_name).cloned()
    }

    /// Check if a specification (complete or not) is cached.
    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.lookup(type_name).is_some()
    }

    /// Snapshot of every cached specification, ordered by type name.
    ///
    /// Mid-bootstrap the snapshot may contain placeholders.
    #[must_use]
    pub fn all_specifications(&self) -> Vec<Arc<ObjectSpecification>> {
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        cache.values().cloned().collect()
    }

    /// Number of cached specifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached specification.
    ///
    /// Outstanding `Arc`s stay valid; later loads build fresh specifications.
    pub fn clear(&self) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        let count = cache.len();
        cache.clear();
        tracing::debug!(count, "specification cache cleared");
    }

    fn cached(&self, type_name: &str) -> Result<Option<Arc<ObjectSpecification>>, MetamodelError> {
        let cache = self
            .cache
            .read()
            .map_err(|_| MetamodelError::LockPoisoned("specification cache"))?;
        Ok(cache.get(type_name).cloned())
    }

    fn is_introspector(&self) -> Result<bool, MetamodelError> {
        let slot = self
            .introspector
            .lock()
            .map_err(|_| MetamodelError::LockPoisoned("introspector"))?;
        Ok(*slot == Some(thread::current().id()))
    }

    fn claim_introspector(&self) -> Result<IntrospectorGuard<'_>, MetamodelError> {
        let mut slot = self
            .introspector
            .lock()
            .map_err(|_| MetamodelError::LockPoisoned("introspector"))?;
        *slot = Some(thread::current().id());
        Ok(IntrospectorGuard {
            slot: &self.introspector,
        })
    }

    /// Describe, insert the placeholder, run the pipeline, publish or evict.
    fn introspect(&self, type_name: &str) -> Result<Arc<ObjectSpecification>, MetamodelError> {
        let descriptor = self.source.describe(type_name)?;
        let spec = Arc::new(ObjectSpecification::placeholder(type_name)?);
        {
            let mut cache = self
                .cache
                .write()
                .map_err(|_| MetamodelError::LockPoisoned("specification cache"))?;
            cache.insert(type_name.to_string(), Arc::clone(&spec));
        }
        tracing::debug!(type_name, "introspecting");

        match introspector::introspect(self, &descriptor) {
            Ok(body) => {
                let members = body.members.len();
                spec.complete(body);
                tracing::debug!(type_name, members, "specification complete");
                Ok(spec)
            }
            Err(error) => {
                self.evict(type_name);
                tracing::warn!(type_name, %error, "introspection failed; placeholder evicted");
                Err(error)
            }
        }
    }

    fn evict(&self, type_name: &str) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.remove(type_name);
    }
}

impl std::fmt::Debug for SpecificationLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecificationLoader")
            .field("pipeline", &self.pipeline)
            .field("config", &self.config)
            .field("cached", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::{ClassDescriptor, MethodDescriptor, TypeCatalog};
    use crate::TypeRef;

    fn loader(types: Vec<ClassDescriptor>) -> SpecificationLoader {
        let catalog = TypeCatalog::from_descriptors(types).expect("catalog");
        SpecificationLoader::new(catalog, ReflectorConfig::default())
    }

    #[test]
    fn completed_load_skips_introspection_locks() {
        let loader = loader(vec![ClassDescriptor::new("Customer")]);
        let first = loader.load("Customer").expect("load");

        let introspection = loader.introspection.lock().expect("introspection");
        let slot = loader.introspector.lock().expect("slot");
        let (tx, rx) = std::sync::mpsc::channel();
        thread::scope(|scope| {
            scope.spawn(|| {
                let _ = tx.send(loader.load("Customer"));
            });
            let received = rx.recv_timeout(std::time::Duration::from_secs(5));
            drop(slot);
            drop(introspection);

            let second = received
                .expect("completed load must not wait on introspection")
                .expect("load");
            assert!(Arc::ptr_eq(&first, &second));
        });
    }

    #[test]
    fn same_arc_on_repeated_load() {
        let loader = loader(vec![ClassDescriptor::new("Customer")]);
        let first = loader.load("Customer").expect("load");
        let second = loader.load("Customer").expect("load");
        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.is_complete());
    }

    #[test]
    fn unknown_type_leaves_no_entry() {
        let loader = loader(vec![]);
        assert!(matches!(
            loader.load("Missing"),
            Err(MetamodelError::UnknownType(_))
        ));
        assert!(!loader.contains("Missing"));
    }

    #[test]
    fn lookup_never_introspects() {
        let loader = loader(vec![ClassDescriptor::new("Customer")]);
        assert!(loader.lookup("Customer").is_none());
        loader.load("Customer").expect("load");
        assert!(loader.lookup("Customer").is_some());
    }

    #[test]
    fn mutual_references_terminate() {
        let a = ClassDescriptor::new("A")
            .with_method(MethodDescriptor::new("getB", TypeRef::named("B")));
        let b = ClassDescriptor::new("B")
            .with_method(MethodDescriptor::new("getA", TypeRef::named("A")));
        let loader = loader(vec![a, b]);

        let spec_a = loader.load("A").expect("load A");
        let spec_b = loader.lookup("B").expect("B loaded through A");
        assert!(spec_a.is_complete());
        assert!(spec_b.is_complete());
        assert!(Arc::ptr_eq(&spec_a, &loader.load("A").expect("reload")));
    }

    #[test]
    fn snapshot_is_sorted_and_clear_empties() {
        let loader = loader(vec![ClassDescriptor::new("Zeta"), ClassDescriptor::new("Alpha")]);
        loader.load("Zeta").expect("load");
        loader.load("Alpha").expect("load");
        let names: Vec<_> = loader
            .all_specifications()
            .iter()
            .map(|s| s.type_name().to_string())
            .collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);

        loader.clear();
        assert!(loader.is_empty());
    }
}
