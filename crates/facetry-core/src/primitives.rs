//! # Programming Model Primitives
//!
//! Hardcoded conventions and constants for the Facetry metamodel engine.
//!
//! The engine starts with zero types but a fixed programming model.
//! These primitives are compiled into the binary and are immutable at runtime.
//!
//! ## Conventions
//!
//! 1. **Accessor Prefixes**: `get`/`is` mark property and collection accessors.
//! 2. **Support Prefixes**: `hide`, `disable`, `validate`, ... mark methods that
//!    contribute behavior to another member and are never members themselves.
//! 3. **Built-in Types**: value types, collection containers and `void` are
//!    known without being declared in a catalog.

/// Prefix of a property or collection accessor (`getName`).
pub const GET_PREFIX: &str = "get";

/// Prefix of a boolean property accessor (`isActive`).
pub const IS_PREFIX: &str = "is";

/// Prefix of a property mutator (`setName`).
pub const SET_PREFIX: &str = "set";

/// Prefix of a property modify callback (`modifyName`).
pub const MODIFY_PREFIX: &str = "modify";

/// Prefix of a property clear callback (`clearName`).
pub const CLEAR_PREFIX: &str = "clear";

/// Prefix of a collection add callback (`addToOrders`).
pub const ADD_TO_PREFIX: &str = "addTo";

/// Prefix of a collection remove callback (`removeFromOrders`).
pub const REMOVE_FROM_PREFIX: &str = "removeFrom";

/// Prefix of a visibility support method (`hideName`).
pub const HIDE_PREFIX: &str = "hide";

/// Prefix of a usability support method (`disableName`).
pub const DISABLE_PREFIX: &str = "disable";

/// Prefix of a validation support method (`validateName`, `validate0PlaceOrder`).
pub const VALIDATE_PREFIX: &str = "validate";

/// Prefix of a choices support method (`choicesName`, `choices0PlaceOrder`).
pub const CHOICES_PREFIX: &str = "choices";

/// Prefix of a default-value support method (`defaultName`, `default0PlaceOrder`).
pub const DEFAULT_PREFIX: &str = "default";

/// Prefix of an auto-complete support method (`autoCompleteName`).
pub const AUTO_COMPLETE_PREFIX: &str = "autoComplete";

/// Every prefix reserved by the programming model for support methods.
///
/// A method carrying one of these prefixes is never an action. If nothing
/// consumes it during introspection it is rejected.
pub const RESERVED_PREFIXES: &[&str] = &[
    SET_PREFIX,
    MODIFY_PREFIX,
    CLEAR_PREFIX,
    ADD_TO_PREFIX,
    REMOVE_FROM_PREFIX,
    HIDE_PREFIX,
    DISABLE_PREFIX,
    VALIDATE_PREFIX,
    CHOICES_PREFIX,
    DEFAULT_PREFIX,
    AUTO_COMPLETE_PREFIX,
];

/// Name of the title support method on a domain object.
pub const TITLE_METHOD: &str = "title";

/// Methods that are never part of the metamodel.
pub const IGNORED_METHODS: &[&str] = &["toString", "hashCode", "equals", "getClass", "clone"];

/// Name of the void pseudo-type.
pub const VOID_TYPE: &str = "void";

/// Built-in value types. Their specifications carry value semantics.
pub const VALUE_TYPES: &[&str] = &[
    "bool", "byte", "short", "int", "long", "float", "double", "char", "string", "decimal",
    "biginteger", "date", "time", "datetime", "timestamp", "uuid", "url", "blob", "clob",
];

/// Built-in collection container types.
pub const COLLECTION_TYPES: &[&str] = &["list", "set", "sortedset", "collection", "array"];

/// Maximum nesting depth accepted when resolving super-types.
///
/// Guards against malformed catalogs whose super-type chain loops.
pub const MAX_SUPERTYPE_DEPTH: usize = 64;

/// Maximum number of parameters an action may declare.
pub const MAX_ACTION_PARAMETERS: usize = 32;

// =============================================================================
// EXPORT FORMAT
// =============================================================================

/// Magic bytes for the canonical metamodel export header.
pub const MAGIC_BYTES: &[u8; 4] = b"FMMX";

/// Current canonical export format version.
///
/// Increment this when making breaking changes to the snapshot layout.
pub const FORMAT_VERSION: u8 = 1;

/// Maximum accepted canonical export payload (64 MB).
pub const MAX_EXPORT_PAYLOAD_SIZE: usize = 64 * 1024 * 1024;

/// Returns `true` if `name` is a built-in value type.
#[must_use]
pub fn is_value_type(name: &str) -> bool {
    VALUE_TYPES.contains(&name)
}

/// Returns `true` if `name` is a built-in collection container.
#[must_use]
pub fn is_collection_type(name: &str) -> bool {
    COLLECTION_TYPES.contains(&name)
}

/// Returns the reserved prefix `method_name` starts with, if any.
///
/// A prefix only counts when it is followed by an upper-case letter or a
/// digit, so `settle` and `defaultsFor` are not support methods while
/// `setName` and `default0PlaceOrder` are.
#[must_use]
pub fn reserved_prefix_of(method_name: &str) -> Option<&'static str> {
    RESERVED_PREFIXES
        .iter()
        .filter(|prefix| has_convention_prefix(method_name, prefix))
        .max_by_key(|prefix| prefix.len())
        .copied()
}

/// Returns `true` if `name` starts with `prefix` followed by an upper-case
/// letter or a digit.
#[must_use]
pub fn has_convention_prefix(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix)
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"FMMX");
    }

    #[test]
    fn reserved_prefix_requires_boundary() {
        assert_eq!(reserved_prefix_of("setName"), Some("set"));
        assert_eq!(reserved_prefix_of("settle"), None);
        assert_eq!(reserved_prefix_of("default0PlaceOrder"), Some("default"));
        assert_eq!(reserved_prefix_of("defaults"), None);
        assert_eq!(reserved_prefix_of("placeOrder"), None);
    }

    #[test]
    fn longest_reserved_prefix_wins() {
        // "autoComplete" must not be read as some shorter prefix.
        assert_eq!(reserved_prefix_of("autoCompleteCustomer"), Some("autoComplete"));
        assert_eq!(reserved_prefix_of("removeFromOrders"), Some("removeFrom"));
    }

    #[test]
    fn builtin_type_tables() {
        assert!(is_value_type("string"));
        assert!(!is_value_type("Customer"));
        assert!(is_collection_type("list"));
        assert!(!is_collection_type("string"));
    }
}
