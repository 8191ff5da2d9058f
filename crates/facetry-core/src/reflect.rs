//! # Reflection Source
//!
//! The declarative "candidate enumerator" the engine introspects.
//!
//! Types are described as plain data (`ClassDescriptor`, `MethodDescriptor`,
//! `ParamDescriptor`, `Annotation`) instead of being read from a host
//! language's reflection API. Anything that can produce these values can feed
//! the pipeline: a catalog file, a code generator, a test fixture.
//!
//! `TypeCatalog` is the in-memory implementation. Besides the declared types it
//! synthesizes descriptors for built-in value types, collection containers and
//! `void`, so every type that appears in a signature can be specified.

use crate::primitives::{self, VOID_TYPE};
use crate::{MetamodelError, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// =============================================================================
// ANNOTATIONS
// =============================================================================

/// Value of an annotation attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// A declarative marker attached to a type, method or parameter.
///
/// Annotations are inputs only: the engine never defines what a domain
/// annotation means beyond what its factories look for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Annotation name, e.g. `Property`, `Named`, `HomePage`.
    pub name: String,
    /// Attribute values keyed by attribute name.
    #[serde(default)]
    pub attributes: BTreeMap<String, AnnotationValue>,
}

impl Annotation {
    /// Create an annotation without attributes.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Add an attribute (builder style).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: AnnotationValue) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Add a text attribute (builder style).
    #[must_use]
    pub fn with_text(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(key, AnnotationValue::Text(value.into()))
    }

    /// Text attribute, if present and textual.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(AnnotationValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// Boolean attribute. Accepts `true`/`false` text as well.
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.attributes.get(key) {
            Some(AnnotationValue::Bool(b)) => Some(*b),
            Some(AnnotationValue::Text(s)) => s.parse().ok(),
            _ => None,
        }
    }

    /// Integer attribute. Accepts numeric text as well.
    #[must_use]
    pub fn int(&self, key: &str) -> Option<i64> {
        match self.attributes.get(key) {
            Some(AnnotationValue::Int(n)) => Some(*n),
            Some(AnnotationValue::Text(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Find an annotation by name.
pub(crate) fn find_annotation<'a>(annotations: &'a [Annotation], name: &str) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.name == name)
}

// =============================================================================
// DESCRIPTORS
// =============================================================================

/// Structural kind of a described type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    /// A concrete, instantiable type.
    #[default]
    Class,
    /// An abstract type: introspected, never instantiated.
    Abstract,
    /// An interface: introspected, never instantiated.
    Interface,
    /// A built-in value type.
    Value,
    /// A built-in collection container.
    Collection,
    /// The `void` pseudo-type.
    Void,
}

/// A positional parameter of a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDescriptor {
    /// Declared type.
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    /// Declared name, when the source retains parameter names.
    #[serde(default)]
    pub name: Option<String>,
    /// Parameter annotations.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl ParamDescriptor {
    /// Create an unnamed parameter.
    #[must_use]
    pub fn new(type_ref: TypeRef) -> Self {
        Self {
            type_ref,
            name: None,
            annotations: Vec::new(),
        }
    }

    /// Set the declared name (builder style).
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add an annotation (builder style).
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Find an annotation by name.
    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        find_annotation(&self.annotations, name)
    }
}

fn default_return() -> TypeRef {
    TypeRef::Void
}

fn default_public() -> bool {
    true
}

/// A reflected method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    /// Method name.
    pub name: String,
    /// Return type (`void` when omitted).
    #[serde(default = "default_return")]
    pub returns: TypeRef,
    /// Positional parameters.
    #[serde(default)]
    pub parameters: Vec<ParamDescriptor>,
    /// Method annotations.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Static methods are never members.
    #[serde(default, rename = "static")]
    pub is_static: bool,
    /// Non-public methods are never members.
    #[serde(default = "default_public")]
    pub public: bool,
}

impl MethodDescriptor {
    /// Create a public, non-static, parameterless method.
    #[must_use]
    pub fn new(name: impl Into<String>, returns: TypeRef) -> Self {
        Self {
            name: name.into(),
            returns,
            parameters: Vec::new(),
            annotations: Vec::new(),
            is_static: false,
            public: true,
        }
    }

    /// Append a parameter (builder style).
    #[must_use]
    pub fn with_param(mut self, param: ParamDescriptor) -> Self {
        self.parameters.push(param);
        self
    }

    /// Add an annotation (builder style).
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Find an annotation by name.
    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        find_annotation(&self.annotations, name)
    }

    /// Check for an annotation by name.
    #[must_use]
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }

    /// Declared parameter types, in order.
    #[must_use]
    pub fn parameter_types(&self) -> Vec<TypeRef> {
        self.parameters.iter().map(|p| p.type_ref.clone()).collect()
    }

    /// Signature key: name plus parameter types. Overriding declarations share it.
    #[must_use]
    pub fn signature(&self) -> (String, Vec<TypeRef>) {
        (self.name.clone(), self.parameter_types())
    }
}

/// A reflected type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Fully qualified type name; the cache key.
    pub name: String,
    /// Structural kind.
    #[serde(default)]
    pub kind: TypeKind,
    /// Direct super-type, if any.
    #[serde(default)]
    pub superclass: Option<String>,
    /// Implemented interfaces.
    #[serde(default)]
    pub interfaces: Vec<String>,
    /// Type annotations.
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Declared methods (inherited ones are resolved through `superclass`).
    #[serde(default)]
    pub methods: Vec<MethodDescriptor>,
}

impl ClassDescriptor {
    /// Create an empty concrete type.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::of_kind(name, TypeKind::Class)
    }

    /// Create an empty type of the given kind.
    #[must_use]
    pub fn of_kind(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            superclass: None,
            interfaces: Vec::new(),
            annotations: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Set the super-type (builder style).
    #[must_use]
    pub fn extending(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    /// Add an annotation (builder style).
    #[must_use]
    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Add a method (builder style).
    #[must_use]
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Find an annotation by name.
    #[must_use]
    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        find_annotation(&self.annotations, name)
    }

    /// Check for an annotation by name.
    #[must_use]
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }
}

// =============================================================================
// CLASS SOURCE
// =============================================================================

/// Source of reflected type descriptions.
///
/// Implementors must be `Send + Sync`: the loader that owns them is shared by
/// every consumer of the metamodel.
pub trait ClassSource: Send + Sync {
    /// Describe the named type.
    ///
    /// Returns `MetamodelError::UnknownType` when the type cannot be described.
    fn describe(&self, type_name: &str) -> Result<ClassDescriptor, MetamodelError>;

    /// Names of the types this source declares (built-ins excluded), in
    /// deterministic order. Bootstrap loads each of them.
    fn declared_types(&self) -> Vec<String>;
}

/// Serialized form of a catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogDocument {
    /// Declared types.
    #[serde(default)]
    pub types: Vec<ClassDescriptor>,
}

/// In-memory class source backed by a set of descriptors.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: BTreeMap<String, ClassDescriptor>,
}

impl TypeCatalog {
    /// Create an empty catalog (built-ins only).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from descriptors. Duplicate type names are rejected.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = ClassDescriptor>,
    ) -> Result<Self, MetamodelError> {
        let mut catalog = Self::new();
        for descriptor in descriptors {
            catalog.insert(descriptor)?;
        }
        Ok(catalog)
    }

    /// Build a catalog from a parsed document.
    pub fn from_document(document: CatalogDocument) -> Result<Self, MetamodelError> {
        Self::from_descriptors(document.types)
    }

    /// Parse a TOML catalog document.
    pub fn from_toml_str(text: &str) -> Result<Self, MetamodelError> {
        let document: CatalogDocument = toml::from_str(text)
            .map_err(|e| MetamodelError::DeserializationError(e.to_string()))?;
        Self::from_document(document)
    }

    /// Add a descriptor. Duplicate type names are rejected.
    pub fn insert(&mut self, descriptor: ClassDescriptor) -> Result<(), MetamodelError> {
        if descriptor.name.trim().is_empty() {
            return Err(MetamodelError::InvalidIdentifier(
                "catalog type without a name".to_string(),
            ));
        }
        if self.types.contains_key(&descriptor.name) {
            return Err(MetamodelError::DeserializationError(format!(
                "duplicate type '{}' in catalog",
                descriptor.name
            )));
        }
        self.types.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    /// Number of declared types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no types are declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Export as a serializable document.
    #[must_use]
    pub fn to_document(&self) -> CatalogDocument {
        CatalogDocument {
            types: self.types.values().cloned().collect(),
        }
    }
}

impl ClassSource for TypeCatalog {
    fn describe(&self, type_name: &str) -> Result<ClassDescriptor, MetamodelError> {
        if let Some(descriptor) = self.types.get(type_name) {
            return Ok(descriptor.clone());
        }
        if type_name == VOID_TYPE {
            return Ok(ClassDescriptor::of_kind(type_name, TypeKind::Void));
        }
        if primitives::is_value_type(type_name) {
            return Ok(ClassDescriptor::of_kind(type_name, TypeKind::Value));
        }
        if primitives::is_collection_type(type_name) {
            return Ok(ClassDescriptor::of_kind(type_name, TypeKind::Collection));
        }
        Err(MetamodelError::UnknownType(type_name.to_string()))
    }

    fn declared_types(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
