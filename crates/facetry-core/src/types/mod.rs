//! # Core Type Definitions
//!
//! This module contains the naming and classification primitives used as keys
//! everywhere else in the engine:
//! - Structural classification (`FeatureType`)
//! - Stable element keys (`Identifier`)
//! - Type references as they appear in signatures (`TypeRef`)
//! - Error types (`MetamodelError`)
//! - Name derivation helpers (bean names, natural names)
//!
//! ## Determinism Guarantees
//!
//! All key types implement `Ord` so they can live in `BTreeMap`/`BTreeSet`
//! and produce identical iteration order on every run.

use crate::primitives::{self, GET_PREFIX, IS_PREFIX, VOID_TYPE};
use crate::validation::ValidationFailures;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// FEATURE TYPE
// =============================================================================

/// The kind of structural element a facet or factory applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    /// The type itself.
    Object,
    /// A scalar member read through an accessor.
    Property,
    /// A multi-valued member read through an accessor.
    Collection,
    /// An invokable member.
    Action,
    /// A positional parameter of an action.
    ActionParameter,
}

impl FeatureType {
    /// The type only.
    pub const OBJECTS_ONLY: &'static [FeatureType] = &[FeatureType::Object];

    /// Properties only.
    pub const PROPERTIES_ONLY: &'static [FeatureType] = &[FeatureType::Property];

    /// Collections only.
    pub const COLLECTIONS_ONLY: &'static [FeatureType] = &[FeatureType::Collection];

    /// Actions only.
    pub const ACTIONS_ONLY: &'static [FeatureType] = &[FeatureType::Action];

    /// Action parameters only.
    pub const PARAMETERS_ONLY: &'static [FeatureType] = &[FeatureType::ActionParameter];

    /// Properties and collections (accessor-based members).
    pub const PROPERTIES_AND_COLLECTIONS: &'static [FeatureType] =
        &[FeatureType::Property, FeatureType::Collection];

    /// Every member kind.
    pub const MEMBERS: &'static [FeatureType] = &[
        FeatureType::Property,
        FeatureType::Collection,
        FeatureType::Action,
    ];

    /// Properties and action parameters (scalar inputs).
    pub const PROPERTIES_AND_PARAMETERS: &'static [FeatureType] =
        &[FeatureType::Property, FeatureType::ActionParameter];

    /// Every feature type.
    pub const EVERYTHING: &'static [FeatureType] = &[
        FeatureType::Object,
        FeatureType::Property,
        FeatureType::Collection,
        FeatureType::Action,
        FeatureType::ActionParameter,
    ];

    /// Get the feature type name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            FeatureType::Object => "object",
            FeatureType::Property => "property",
            FeatureType::Collection => "collection",
            FeatureType::Action => "action",
            FeatureType::ActionParameter => "parameter",
        }
    }

    /// Check if this is a member kind (property, collection or action).
    #[must_use]
    pub fn is_member(&self) -> bool {
        matches!(
            self,
            FeatureType::Property | FeatureType::Collection | FeatureType::Action
        )
    }

    /// Check if this member is read through an accessor.
    #[must_use]
    pub fn is_property_or_collection(&self) -> bool {
        matches!(self, FeatureType::Property | FeatureType::Collection)
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// TYPE REFERENCE
// =============================================================================

/// A type as it appears in a signature: `void`, `Customer`, `list<Order>`.
///
/// Serialized as its textual form so catalogs stay readable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeRef {
    /// No value.
    Void,
    /// A plain named type.
    Named(String),
    /// A collection container with a declared element type.
    Collection { container: String, element: String },
}

impl TypeRef {
    /// Create a plain named type reference.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Create a `container<element>` reference.
    #[must_use]
    pub fn collection(container: impl Into<String>, element: impl Into<String>) -> Self {
        Self::Collection {
            container: container.into(),
            element: element.into(),
        }
    }

    /// Parse the textual form.
    ///
    /// Accepts `void`, a bare name, or a single level of generics
    /// (`list<Order>`). Nested generics are rejected.
    pub fn parse(text: &str) -> Result<Self, MetamodelError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(MetamodelError::InvalidTypeRef(text.to_string()));
        }
        if text == VOID_TYPE {
            return Ok(Self::Void);
        }

        match text.split_once('<') {
            None => {
                if text.contains('>') || text.contains(char::is_whitespace) {
                    return Err(MetamodelError::InvalidTypeRef(text.to_string()));
                }
                Ok(Self::Named(text.to_string()))
            }
            Some((container, rest)) => {
                let element = rest
                    .strip_suffix('>')
                    .map(str::trim)
                    .filter(|e| !e.is_empty() && !e.contains(['<', '>']))
                    .ok_or_else(|| MetamodelError::InvalidTypeRef(text.to_string()))?;
                let container = container.trim();
                if container.is_empty() {
                    return Err(MetamodelError::InvalidTypeRef(text.to_string()));
                }
                Ok(Self::collection(container, element))
            }
        }
    }

    /// Name of the type that owns the values (the container for collections).
    #[must_use]
    pub fn type_name(&self) -> &str {
        match self {
            TypeRef::Void => VOID_TYPE,
            TypeRef::Named(name) => name,
            TypeRef::Collection { container, .. } => container,
        }
    }

    /// Declared element type, for generic collection references.
    #[must_use]
    pub fn element_type(&self) -> Option<&str> {
        match self {
            TypeRef::Collection { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Check if this is `void`.
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    /// Check if this refers to a collection (generic or raw container).
    #[must_use]
    pub fn is_collection(&self) -> bool {
        match self {
            TypeRef::Collection { .. } => true,
            TypeRef::Named(name) => primitives::is_collection_type(name),
            TypeRef::Void => false,
        }
    }

    /// Check if this is the built-in boolean type.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        matches!(self, TypeRef::Named(name) if name == "bool")
    }

    /// Simple (unqualified) name: `com.acme.Customer` → `Customer`.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        let name = self.type_name();
        name.rsplit(['.', ':']).next().unwrap_or(name)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => f.write_str(VOID_TYPE),
            TypeRef::Named(name) => f.write_str(name),
            TypeRef::Collection { container, element } => write!(f, "{container}<{element}>"),
        }
    }
}

impl TryFrom<String> for TypeRef {
    type Error = MetamodelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

// =============================================================================
// IDENTIFIER
// =============================================================================

/// Stable key of a structural element, used for facet lookup and error
/// reporting.
///
/// Two identifiers are equal iff the owning type, the member name and the
/// parameter type list all match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Identifier {
    class_name: String,
    member_name: Option<String>,
    parameter_types: Option<Vec<String>>,
}

impl Identifier {
    /// Identifier of a type.
    pub fn class(class_name: impl Into<String>) -> Result<Self, MetamodelError> {
        let class_name = class_name.into();
        if class_name.trim().is_empty() {
            return Err(MetamodelError::InvalidIdentifier(
                "type name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            class_name,
            member_name: None,
            parameter_types: None,
        })
    }

    /// Identifier of a property or collection, keyed by its bean name.
    pub fn property_or_collection(
        class_name: impl Into<String>,
        member_name: impl Into<String>,
    ) -> Result<Self, MetamodelError> {
        let member_name = member_name.into();
        if member_name.is_empty() {
            return Err(MetamodelError::InvalidIdentifier(
                "member name must not be empty".to_string(),
            ));
        }
        let mut id = Self::class(class_name)?;
        id.member_name = Some(member_name);
        Ok(id)
    }

    /// Identifier of an action, keyed by method name and parameter types.
    pub fn action(
        class_name: impl Into<String>,
        action_name: impl Into<String>,
        parameter_types: &[TypeRef],
    ) -> Result<Self, MetamodelError> {
        let mut id = Self::property_or_collection(class_name, action_name)?;
        id.parameter_types = Some(parameter_types.iter().map(TypeRef::to_string).collect());
        Ok(id)
    }

    /// Derive the identifier of a reflected method for the given feature type.
    ///
    /// - object: type identity only
    /// - property/collection: the de-accessor-prefixed bean name
    /// - action: method name plus parameter type list
    /// - parameter: the owning action's identifier (parameters are positional)
    pub fn for_method(
        feature_type: FeatureType,
        class_name: &str,
        method_name: &str,
        parameter_types: &[TypeRef],
    ) -> Result<Self, MetamodelError> {
        match feature_type {
            FeatureType::Object => Self::class(class_name),
            FeatureType::Property | FeatureType::Collection => {
                Self::property_or_collection(class_name, bean_name(method_name)?)
            }
            FeatureType::Action | FeatureType::ActionParameter => {
                Self::action(class_name, method_name, parameter_types)
            }
        }
    }

    /// Name of the owning type.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Member name, if this identifies a member.
    #[must_use]
    pub fn member_name(&self) -> Option<&str> {
        self.member_name.as_deref()
    }

    /// Parameter type names, if this identifies an action.
    #[must_use]
    pub fn parameter_types(&self) -> Option<&[String]> {
        self.parameter_types.as_deref()
    }

    /// Identifier of the owning type.
    #[must_use]
    pub fn class_identifier(&self) -> Self {
        Self {
            class_name: self.class_name.clone(),
            member_name: None,
            parameter_types: None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.class_name)?;
        if let Some(member) = &self.member_name {
            write!(f, "#{member}")?;
        }
        if let Some(params) = &self.parameter_types {
            write!(f, "({})", params.join(","))?;
        }
        Ok(())
    }
}

// =============================================================================
// NAME DERIVATION
// =============================================================================

/// Strip the accessor prefix from a getter and apply bean decapitalization.
///
/// `getName` → `name`, `isActive` → `active`, `getURL` → `URL`.
pub fn bean_name(accessor: &str) -> Result<String, MetamodelError> {
    let rest = if primitives::has_convention_prefix(accessor, GET_PREFIX) {
        &accessor[GET_PREFIX.len()..]
    } else if primitives::has_convention_prefix(accessor, IS_PREFIX) {
        &accessor[IS_PREFIX.len()..]
    } else {
        return Err(MetamodelError::InvalidIdentifier(format!(
            "'{}' is not an accessor",
            accessor
        )));
    };
    Ok(decapitalize(rest))
}

/// Lower-case the first character unless the first two are both upper-case.
#[must_use]
pub fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
            name.to_string()
        }
        (Some(first), _) => first.to_lowercase().chain(name.chars().skip(1)).collect(),
        (None, _) => String::new(),
    }
}

/// Upper-case the first character.
#[must_use]
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Human-readable name for an identifier: `firstName` → `First Name`,
/// `URLPath` → `URL Path`, `order_total` → `Order Total`.
#[must_use]
pub fn natural_name(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
            continue;
        }
        if i > 0 && c.is_uppercase() && !out.ends_with(' ') {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                out.push(' ');
            }
        }
        if out.is_empty() || out.ends_with(' ') {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
    }

    out
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while building or consuming the metamodel.
///
/// - No silent failures
/// - Use `Result<T, MetamodelError>` for fallible operations
/// - Structural errors abort the introspection of one type; model-consistency
///   problems are collected as validation failures instead
#[derive(Debug, Error)]
pub enum MetamodelError {
    /// The requested type is not known to the class source.
    #[error("Unknown type: {0}")]
    UnknownType(String),

    /// An identifier could not be derived from malformed input.
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A type reference could not be parsed.
    #[error("Invalid type reference: '{0}'")]
    InvalidTypeRef(String),

    /// A facet factory failed while processing an element.
    #[error("Facet factory '{factory}' failed on {identifier}: {reason}")]
    FactoryFailed {
        factory: &'static str,
        identifier: Identifier,
        reason: String,
    },

    /// The validation pass reported failures and the caller escalated them.
    #[error("Metamodel validation failed with {} failure(s)", .0.len())]
    Validation(ValidationFailures),

    /// A lock guarding the specification cache was poisoned.
    #[error("Lock poisoned: {0}")]
    LockPoisoned(&'static str),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// A configuration document could not be read.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An I/O error occurred (app layer).
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bean_name_strips_accessor_prefix() {
        assert_eq!(bean_name("getName").expect("bean"), "name");
        assert_eq!(bean_name("isActive").expect("bean"), "active");
        assert_eq!(bean_name("getURL").expect("bean"), "URL");
        assert_eq!(bean_name("getX").expect("bean"), "x");
    }

    #[test]
    fn bean_name_rejects_non_accessor() {
        assert!(bean_name("get").is_err());
        assert!(bean_name("getter").is_err());
        assert!(bean_name("placeOrder").is_err());
    }

    #[test]
    fn natural_name_splits_words() {
        assert_eq!(natural_name("name"), "Name");
        assert_eq!(natural_name("firstName"), "First Name");
        assert_eq!(natural_name("placeOrder"), "Place Order");
        assert_eq!(natural_name("URLPath"), "URL Path");
        assert_eq!(natural_name("order_total"), "Order Total");
    }

    #[test]
    fn identifier_derivation_per_feature_type() {
        let object = Identifier::for_method(FeatureType::Object, "Customer", "getName", &[])
            .expect("object");
        assert_eq!(object.to_string(), "Customer");

        let property = Identifier::for_method(FeatureType::Property, "Customer", "getName", &[])
            .expect("property");
        assert_eq!(property.member_name(), Some("name"));
        assert_eq!(property.to_string(), "Customer#name");

        let params = [TypeRef::named("Product"), TypeRef::named("int")];
        let action =
            Identifier::for_method(FeatureType::Action, "Customer", "placeOrder", &params)
                .expect("action");
        assert_eq!(action.to_string(), "Customer#placeOrder(Product,int)");

        let param = Identifier::for_method(
            FeatureType::ActionParameter,
            "Customer",
            "placeOrder",
            &params,
        )
        .expect("param");
        assert_eq!(param, action);
    }

    #[test]
    fn identifier_equality_covers_all_components() {
        let a = Identifier::action("Customer", "pay", &[TypeRef::named("int")]).expect("a");
        let b = Identifier::action("Customer", "pay", &[TypeRef::named("long")]).expect("b");
        let c = Identifier::property_or_collection("Customer", "pay").expect("c");
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.class_identifier(), Identifier::class("Customer").expect("class"));
    }

    #[test]
    fn empty_type_name_is_fatal() {
        assert!(matches!(
            Identifier::class(""),
            Err(MetamodelError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn type_ref_parsing() {
        assert_eq!(TypeRef::parse("void").expect("void"), TypeRef::Void);
        assert_eq!(
            TypeRef::parse("list<Order>").expect("list"),
            TypeRef::collection("list", "Order")
        );
        assert_eq!(TypeRef::parse(" string ").expect("str"), TypeRef::named("string"));
        assert!(TypeRef::parse("list<map<Order>>").is_err());
        assert!(TypeRef::parse("list<").is_err());
        assert!(TypeRef::parse("").is_err());
    }

    #[test]
    fn type_ref_collection_detection() {
        assert!(TypeRef::parse("set<Order>").expect("set").is_collection());
        assert!(TypeRef::named("list").is_collection());
        assert!(!TypeRef::named("Order").is_collection());
        assert_eq!(TypeRef::named("com.acme.Customer").simple_name(), "Customer");
    }
}
