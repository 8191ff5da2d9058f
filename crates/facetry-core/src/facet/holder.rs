//! # Facet Holder
//!
//! The per-element registry of active facets.
//!
//! ## Resolution Rule
//!
//! `add_facet` keeps one facet per `FacetKind`:
//! - a strictly higher precedence replaces the current facet
//! - an equal precedence replaces the current facet (last contributor wins)
//! - a lower precedence is ignored
//!
//! An equal-precedence replacement that changes the facet's attributes is
//! recorded as a `FacetConflict`; the validation pass reports these.
//!
//! Holders are mutable only while their specification is being introspected.
//! Completed specifications hand out shared references only.

use super::{Facet, FacetKind, Precedence, describe_attributes};
use std::collections::BTreeMap;

/// Outcome of adding a facet to a holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No facet of this kind was present.
    Inserted,
    /// The new facet displaced the previous one.
    Replaced,
    /// The previous facet outranks the new one; the new one was dropped.
    Kept,
}

/// Two equal-precedence contributions of one kind that disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetConflict {
    /// The contested capability.
    pub kind: FacetKind,
    /// Shared precedence of both contributions.
    pub precedence: Precedence,
    /// Attributes of the displaced (earlier) facet.
    pub displaced: String,
    /// Attributes of the winning (later) facet.
    pub winner: String,
}

/// Registry of the active facets of one structural element.
#[derive(Debug, Default)]
pub struct FacetHolder {
    facets: BTreeMap<FacetKind, Box<dyn Facet>>,
    conflicts: Vec<FacetConflict>,
}

impl FacetHolder {
    /// Create an empty holder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            facets: BTreeMap::new(),
            conflicts: Vec::new(),
        }
    }

    /// Register a facet under its kind, resolving against any existing one.
    pub fn add_facet(&mut self, facet: Box<dyn Facet>) -> Resolution {
        let kind = facet.kind();
        let Some(existing) = self.facets.get(&kind) else {
            self.facets.insert(kind, facet);
            return Resolution::Inserted;
        };

        let (old, new) = (existing.precedence(), facet.precedence());
        if new < old {
            return Resolution::Kept;
        }

        if new == old {
            let displaced = existing.attributes();
            let winner = facet.attributes();
            if displaced != winner {
                self.conflicts.push(FacetConflict {
                    kind,
                    precedence: new,
                    displaced: describe_attributes(&displaced),
                    winner: describe_attributes(&winner),
                });
            }
        }

        self.facets.insert(kind, facet);
        Resolution::Replaced
    }

    /// Register a concrete facet.
    pub fn add<F: Facet>(&mut self, facet: F) -> Resolution {
        self.add_facet(Box::new(facet))
    }

    /// Register a facet if one was produced. `None` is a no-op.
    pub fn add_optional<F: Facet>(&mut self, facet: Option<F>) -> Option<Resolution> {
        facet.map(|f| self.add(f))
    }

    /// The active facet of this kind, if any.
    #[must_use]
    pub fn get(&self, kind: FacetKind) -> Option<&dyn Facet> {
        self.facets.get(&kind).map(|f| f.as_ref())
    }

    /// The active facet of this kind, downcast to its concrete type.
    ///
    /// Returns `None` when absent or when the active facet is another type.
    #[must_use]
    pub fn get_as<T: Facet>(&self, kind: FacetKind) -> Option<&T> {
        self.get(kind).and_then(|f| f.as_any().downcast_ref::<T>())
    }

    /// Check if a facet of this kind is active.
    #[must_use]
    pub fn contains(&self, kind: FacetKind) -> bool {
        self.facets.contains_key(&kind)
    }

    /// Active facets in kind order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Facet> {
        self.facets.values().map(|f| f.as_ref())
    }

    /// Number of active facets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.facets.len()
    }

    /// Check if no facets are active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }

    /// Equal-precedence conflicts recorded while the holder was populated.
    #[must_use]
    pub fn conflicts(&self) -> &[FacetConflict] {
        &self.conflicts
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::{MarkerFacet, MaxLengthFacet, NamedFacet};

    #[test]
    fn higher_precedence_wins_in_either_order() {
        let mut holder = FacetHolder::new();
        holder.add(NamedFacet::new("Name", Precedence::Inferred));
        holder.add(NamedFacet::new("Full Name", Precedence::Explicit));
        let named = holder.get_as::<NamedFacet>(FacetKind::Named).expect("named");
        assert_eq!(named.value(), "Full Name");

        let mut holder = FacetHolder::new();
        holder.add(NamedFacet::new("Full Name", Precedence::Explicit));
        let resolution = holder.add(NamedFacet::new("Name", Precedence::Inferred));
        assert_eq!(resolution, Resolution::Kept);
        let named = holder.get_as::<NamedFacet>(FacetKind::Named).expect("named");
        assert_eq!(named.value(), "Full Name");
    }

    #[test]
    fn equal_precedence_last_contributor_wins() {
        let mut holder = FacetHolder::new();
        assert_eq!(
            holder.add(NamedFacet::new("First", Precedence::Explicit)),
            Resolution::Inserted
        );
        assert_eq!(
            holder.add(NamedFacet::new("Second", Precedence::Explicit)),
            Resolution::Replaced
        );

        let named = holder.get_as::<NamedFacet>(FacetKind::Named).expect("named");
        assert_eq!(named.value(), "Second");
        assert_eq!(holder.len(), 1);
    }

    #[test]
    fn equal_precedence_disagreement_is_recorded() {
        let mut holder = FacetHolder::new();
        holder.add(MaxLengthFacet::new(10, Precedence::Explicit));
        holder.add(MaxLengthFacet::new(10, Precedence::Explicit));
        assert!(holder.conflicts().is_empty());

        holder.add(MaxLengthFacet::new(20, Precedence::Explicit));
        assert_eq!(holder.conflicts().len(), 1);
        let conflict = &holder.conflicts()[0];
        assert_eq!(conflict.kind, FacetKind::MaxLength);
        assert_eq!(conflict.displaced, "value=10");
        assert_eq!(conflict.winner, "value=20");
    }

    #[test]
    fn missing_facet_is_absent_not_error() {
        let holder = FacetHolder::new();
        assert!(holder.get(FacetKind::Hidden).is_none());
        assert!(!holder.contains(FacetKind::Hidden));
        assert!(holder.is_empty());
    }

    #[test]
    fn optional_none_is_noop() {
        let mut holder = FacetHolder::new();
        assert!(holder.add_optional::<NamedFacet>(None).is_none());
        assert!(holder.is_empty());
    }

    #[test]
    fn typed_lookup_rejects_wrong_type() {
        let mut holder = FacetHolder::new();
        holder.add(MarkerFacet::new(FacetKind::Hidden, Precedence::Explicit));
        assert!(holder.contains(FacetKind::Hidden));
        assert!(holder.get_as::<NamedFacet>(FacetKind::Hidden).is_none());
        assert!(holder.get_as::<MarkerFacet>(FacetKind::Hidden).is_some());
    }
}
