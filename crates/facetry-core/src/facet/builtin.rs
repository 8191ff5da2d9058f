//! Built-in facet implementations, one per capability family.

use super::{Facet, FacetKind, Precedence};
use crate::TypeRef;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// MARKER
// =============================================================================

/// A capability with no data beyond its presence (hidden, immutable, entity…).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerFacet {
    kind: FacetKind,
    precedence: Precedence,
}

impl MarkerFacet {
    /// Create a marker of the given kind.
    #[must_use]
    pub fn new(kind: FacetKind, precedence: Precedence) -> Self {
        Self { kind, precedence }
    }
}

impl Facet for MarkerFacet {
    fn kind(&self) -> FacetKind {
        self.kind
    }

    fn precedence(&self) -> Precedence {
        self.precedence
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// NAMING
// =============================================================================

/// Display name of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFacet {
    value: String,
    precedence: Precedence,
}

impl NamedFacet {
    /// Create a naming facet.
    #[must_use]
    pub fn new(value: impl Into<String>, precedence: Precedence) -> Self {
        Self {
            value: value.into(),
            precedence,
        }
    }

    /// The display name.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Facet for NamedFacet {
    fn kind(&self) -> FacetKind {
        FacetKind::Named
    }

    fn precedence(&self) -> Precedence {
        self.precedence
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![("value", self.value.clone())]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Longer description of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribedAsFacet {
    value: String,
    precedence: Precedence,
}

impl DescribedAsFacet {
    /// Create a description facet.
    #[must_use]
    pub fn new(value: impl Into<String>, precedence: Precedence) -> Self {
        Self {
            value: value.into(),
            precedence,
        }
    }

    /// The description.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Facet for DescribedAsFacet {
    fn kind(&self) -> FacetKind {
        FacetKind::DescribedAs
    }

    fn precedence(&self) -> Precedence {
        self.precedence
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![("value", self.value.clone())]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// USABILITY & VALIDATION
// =============================================================================

/// The element is never editable/invokable; carries the reason shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisabledFacet {
    reason: String,
    precedence: Precedence,
}

impl DisabledFacet {
    /// Create a disabled facet.
    #[must_use]
    pub fn new(reason: impl Into<String>, precedence: Precedence) -> Self {
        Self {
            reason: reason.into(),
            precedence,
        }
    }

    /// Why the element is disabled.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl Facet for DisabledFacet {
    fn kind(&self) -> FacetKind {
        FacetKind::Disabled
    }

    fn precedence(&self) -> Precedence {
        self.precedence
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![("reason", self.reason.clone())]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Maximum length of a textual value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaxLengthFacet {
    value: usize,
    precedence: Precedence,
}

impl MaxLengthFacet {
    /// Create a max-length facet.
    #[must_use]
    pub fn new(value: usize, precedence: Precedence) -> Self {
        Self { value, precedence }
    }

    /// The maximum length.
    #[must_use]
    pub fn value(&self) -> usize {
        self.value
    }

    /// Check a proposed value against the limit.
    #[must_use]
    pub fn exceeds(&self, proposed: &str) -> bool {
        proposed.chars().count() > self.value
    }
}

impl Facet for MaxLengthFacet {
    fn kind(&self) -> FacetKind {
        FacetKind::MaxLength
    }

    fn precedence(&self) -> Precedence {
        self.precedence
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![("value", self.value.to_string())]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Whether a value must be supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MandatoryFacet {
    mandatory: bool,
    precedence: Precedence,
}

impl MandatoryFacet {
    /// A value is required.
    #[must_use]
    pub fn required(precedence: Precedence) -> Self {
        Self {
            mandatory: true,
            precedence,
        }
    }

    /// A value may be omitted.
    #[must_use]
    pub fn optional(precedence: Precedence) -> Self {
        Self {
            mandatory: false,
            precedence,
        }
    }

    /// Check if a value is required.
    #[must_use]
    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }
}

impl Facet for MandatoryFacet {
    fn kind(&self) -> FacetKind {
        FacetKind::Mandatory
    }

    fn precedence(&self) -> Precedence {
        self.precedence
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![("mandatory", self.mandatory.to_string())]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// SUPPORT METHODS
// =============================================================================

/// Behavior delegated to a convention-named method on the domain type
/// (`hideName`, `setName`, `choices0PlaceOrder`, ...).
///
/// One struct serves every method-backed capability; the kind tells which.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportMethodFacet {
    kind: FacetKind,
    method: String,
    precedence: Precedence,
}

impl SupportMethodFacet {
    /// Create a method-backed facet.
    #[must_use]
    pub fn new(kind: FacetKind, method: impl Into<String>, precedence: Precedence) -> Self {
        Self {
            kind,
            method: method.into(),
            precedence,
        }
    }

    /// Name of the method to invoke.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl Facet for SupportMethodFacet {
    fn kind(&self) -> FacetKind {
        self.kind
    }

    fn precedence(&self) -> Precedence {
        self.precedence
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![("method", self.method.clone())]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

/// How an action is invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInvocationFacet {
    method: String,
    returns: TypeRef,
    precedence: Precedence,
}

impl ActionInvocationFacet {
    /// Create an invocation facet.
    #[must_use]
    pub fn new(method: impl Into<String>, returns: TypeRef, precedence: Precedence) -> Self {
        Self {
            method: method.into(),
            returns,
            precedence,
        }
    }

    /// Method to invoke.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Declared return type.
    #[must_use]
    pub fn returns(&self) -> &TypeRef {
        &self.returns
    }
}

impl Facet for ActionInvocationFacet {
    fn kind(&self) -> FacetKind {
        FacetKind::ActionInvocation
    }

    fn precedence(&self) -> Precedence {
        self.precedence
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("method", self.method.clone()),
            ("returns", self.returns.to_string()),
        ]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Side-effect contract of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSemantics {
    /// No side effects; may be invoked freely.
    Safe,
    /// Repeated invocation has the same effect as one.
    Idempotent,
    /// Each invocation has an effect.
    NonIdempotent,
}

impl ActionSemantics {
    /// Parse an annotation value (`safe`, `idempotent`, `non_idempotent`).
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "safe" | "query_only" => Some(Self::Safe),
            "idempotent" => Some(Self::Idempotent),
            "non_idempotent" => Some(Self::NonIdempotent),
            _ => None,
        }
    }

    /// Get the semantics name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ActionSemantics::Safe => "safe",
            ActionSemantics::Idempotent => "idempotent",
            ActionSemantics::NonIdempotent => "non_idempotent",
        }
    }

    /// Check if invoking twice is harmless.
    #[must_use]
    pub fn is_idempotent(&self) -> bool {
        !matches!(self, ActionSemantics::NonIdempotent)
    }
}

/// Side-effect contract facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSemanticsFacet {
    semantics: ActionSemantics,
    precedence: Precedence,
}

impl ActionSemanticsFacet {
    /// Create a semantics facet.
    #[must_use]
    pub fn new(semantics: ActionSemantics, precedence: Precedence) -> Self {
        Self {
            semantics,
            precedence,
        }
    }

    /// The declared semantics.
    #[must_use]
    pub fn semantics(&self) -> ActionSemantics {
        self.semantics
    }
}

impl Facet for ActionSemanticsFacet {
    fn kind(&self) -> FacetKind {
        FacetKind::ActionSemantics
    }

    fn precedence(&self) -> Precedence {
        self.precedence
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![("semantics", self.semantics.name().to_string())]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// LAYOUT
// =============================================================================

/// Where an object's title comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TitleSource {
    /// A `title()` method.
    Method(String),
    /// Properties annotated `@Title`, in order.
    Properties(Vec<String>),
}

/// How to compute an object's title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleFacet {
    source: TitleSource,
    precedence: Precedence,
}

impl TitleFacet {
    /// Create a title facet.
    #[must_use]
    pub fn new(source: TitleSource, precedence: Precedence) -> Self {
        Self { source, precedence }
    }

    /// The title source.
    #[must_use]
    pub fn source(&self) -> &TitleSource {
        &self.source
    }
}

impl Facet for TitleFacet {
    fn kind(&self) -> FacetKind {
        FacetKind::Title
    }

    fn precedence(&self) -> Precedence {
        self.precedence
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        match &self.source {
            TitleSource::Method(m) => vec![("method", m.clone())],
            TitleSource::Properties(p) => vec![("properties", p.join(","))],
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Dewey-decimal position of a member (`1`, `1.2`, `2.10`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberOrderFacet {
    sequence: String,
    precedence: Precedence,
}

impl MemberOrderFacet {
    /// Create a member-order facet.
    #[must_use]
    pub fn new(sequence: impl Into<String>, precedence: Precedence) -> Self {
        Self {
            sequence: sequence.into(),
            precedence,
        }
    }

    /// The raw sequence.
    #[must_use]
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Compare two sequences component-wise (`1.2 < 1.10 < 2`).
    ///
    /// Non-numeric components compare as text after all numeric ones.
    #[must_use]
    pub fn compare(a: &str, b: &str) -> Ordering {
        let mut left = a.split('.');
        let mut right = b.split('.');
        loop {
            match (left.next(), right.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(l), Some(r)) => {
                    let ord = match (l.trim().parse::<u64>(), r.trim().parse::<u64>()) {
                        (Ok(x), Ok(y)) => x.cmp(&y),
                        (Ok(_), Err(_)) => Ordering::Less,
                        (Err(_), Ok(_)) => Ordering::Greater,
                        (Err(_), Err(_)) => l.cmp(r),
                    };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
            }
        }
    }
}

impl Facet for MemberOrderFacet {
    fn kind(&self) -> FacetKind {
        FacetKind::MemberOrder
    }

    fn precedence(&self) -> Precedence {
        self.precedence
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![("sequence", self.sequence.clone())]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

// =============================================================================
// TYPING
// =============================================================================

/// Element type of a collection (member or action result).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeOfFacet {
    element: String,
    precedence: Precedence,
}

impl TypeOfFacet {
    /// Create a type-of facet.
    #[must_use]
    pub fn new(element: impl Into<String>, precedence: Precedence) -> Self {
        Self {
            element: element.into(),
            precedence,
        }
    }

    /// Element type name.
    #[must_use]
    pub fn element(&self) -> &str {
        &self.element
    }
}

impl Facet for TypeOfFacet {
    fn kind(&self) -> FacetKind {
        FacetKind::TypeOf
    }

    fn precedence(&self) -> Precedence {
        self.precedence
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![("element", self.element.clone())]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Why instances of a type cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotInstantiable {
    Void,
    Abstract,
    Interface,
}

impl fmt::Display for NotInstantiable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotInstantiable::Void => "void",
            NotInstantiable::Abstract => "abstract",
            NotInstantiable::Interface => "interface",
        })
    }
}

/// Instances of the type cannot be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotInstantiableFacet {
    reason: NotInstantiable,
    precedence: Precedence,
}

impl NotInstantiableFacet {
    /// Create a not-instantiable facet.
    #[must_use]
    pub fn new(reason: NotInstantiable, precedence: Precedence) -> Self {
        Self { reason, precedence }
    }

    /// Why no instances exist.
    #[must_use]
    pub fn reason(&self) -> NotInstantiable {
        self.reason
    }
}

impl Facet for NotInstantiableFacet {
    fn kind(&self) -> FacetKind {
        FacetKind::NotInstantiable
    }

    fn precedence(&self) -> Precedence {
        self.precedence
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![("reason", self.reason.to_string())]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
