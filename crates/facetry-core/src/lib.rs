//! # facetry-core
//!
//! The metamodel engine for Facetry - THE LOGIC.
//!
//! Given a reflected type (described as plain data by a `ClassSource`), this
//! crate builds an `ObjectSpecification`: the type's properties, collections
//! and actions, each carrying a set of typed facets contributed by an ordered
//! pipeline of facet factories. A specification loader caches one
//! specification per type and survives cyclic type graphs; a validation pass
//! checks the assembled model as a whole.
//!
//! ## Flow
//!
//! ```text
//! ClassSource ─► SpecificationLoader ─► introspector ─► FacetFactoryPipeline
//!                      │ (cache, placeholders)              │
//!                      ▼                                    ▼
//!              ObjectSpecification ◄──────────────── FacetHolder (precedence)
//!                      │
//!                      ▼
//!               ValidationEngine ─► ValidationFailures
//! ```
//!
//! ## Architectural Constraints
//!
//! - No async, no network, no file I/O
//! - Deterministic: `BTreeMap`/`BTreeSet` only, no floats, no randomness
//! - No process-global state: a `MetamodelContext` owns everything

// =============================================================================
// MODULES
// =============================================================================

pub mod config;
pub mod context;
pub mod export;
pub mod facet;
pub mod factory;
mod introspector;
pub mod loader;
pub mod primitives;
pub mod reflect;
pub mod specification;
pub mod system;
pub mod types;
pub mod validation;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    FeatureType, Identifier, MetamodelError, TypeRef, bean_name, capitalize, decapitalize,
    natural_name,
};

// =============================================================================
// RE-EXPORTS: Metamodel Engine
// =============================================================================

pub use config::{MetamodelConfig, ReflectorConfig, ValidationConfig};
pub use context::MetamodelContext;
pub use export::{
    CanonicalHeader, MetamodelSnapshot, canonical_checksum, decode_canonical, export_canonical,
    verify_canonical,
};
pub use facet::{Facet, FacetConflict, FacetHolder, FacetKind, Precedence, Resolution};
pub use factory::{FacetFactory, FacetFactoryPipeline};
pub use loader::SpecificationLoader;
pub use reflect::{
    Annotation, AnnotationValue, ClassDescriptor, ClassSource, MethodDescriptor, ParamDescriptor,
    TypeCatalog, TypeKind,
};
pub use specification::{ObjectMember, ObjectSpecification, ParameterSpec, Specialization};
pub use validation::{MetamodelValidator, ValidationEngine, ValidationFailure, ValidationFailures};

// =============================================================================
// RE-EXPORTS: System (from system module)
// =============================================================================

pub use system::ModelMetrics;

#[cfg(feature = "crypto-hash")]
pub use export::{canonical_crypto_hash, compute_blake3_hash};
