//! Per-type bookkeeping of reflected methods still up for member discovery.

use crate::reflect::MethodDescriptor;

/// The methods of one type that have not been consumed yet.
///
/// Factories remove the support methods they consume so later discovery steps
/// (and later factories) never see them again. Removal is idempotent: removing
/// a method twice, or one that never existed, is a no-op.
#[derive(Debug, Clone, Default)]
pub struct MethodRemover {
    methods: Vec<MethodDescriptor>,
}

impl MethodRemover {
    /// Start from the full method list, in discovery order.
    #[must_use]
    pub fn new(methods: Vec<MethodDescriptor>) -> Self {
        Self { methods }
    }

    /// Methods not yet consumed, in discovery order.
    #[must_use]
    pub fn remaining(&self) -> &[MethodDescriptor] {
        &self.methods
    }

    /// Check if a method of this name is still available.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    /// Find an available method by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Remove every method of this name (all overloads).
    ///
    /// Returns the first removed declaration, or `None` if nothing matched.
    pub fn remove_named(&mut self, name: &str) -> Option<MethodDescriptor> {
        let removed = self.remove_where(|m| m.name == name);
        removed.into_iter().next()
    }

    /// Remove one exact declaration (name and parameter types).
    pub fn remove_method(&mut self, method: &MethodDescriptor) -> bool {
        let signature = method.signature();
        !self.remove_where(|m| m.signature() == signature).is_empty()
    }

    /// Remove every method matching the predicate, returning them in order.
    pub fn remove_where(
        &mut self,
        mut predicate: impl FnMut(&MethodDescriptor) -> bool,
    ) -> Vec<MethodDescriptor> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.methods.len());
        for method in self.methods.drain(..) {
            if predicate(&method) {
                removed.push(method);
            } else {
                kept.push(method);
            }
        }
        self.methods = kept;
        removed
    }

    /// Number of methods still available.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Check if every method has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeRef;

    fn remover() -> MethodRemover {
        MethodRemover::new(vec![
            MethodDescriptor::new("getName", TypeRef::named("string")),
            MethodDescriptor::new("hideName", TypeRef::named("bool")),
            MethodDescriptor::new("pay", TypeRef::Void),
            MethodDescriptor::new("pay", TypeRef::Void)
                .with_param(crate::reflect::ParamDescriptor::new(TypeRef::named("int"))),
        ])
    }

    #[test]
    fn remove_named_is_idempotent() {
        let mut methods = remover();
        assert!(methods.remove_named("hideName").is_some());
        assert!(methods.remove_named("hideName").is_none());
        assert!(methods.remove_named("neverThere").is_none());
        assert_eq!(methods.len(), 3);
    }

    #[test]
    fn remove_named_takes_all_overloads() {
        let mut methods = remover();
        methods.remove_named("pay");
        assert!(!methods.contains("pay"));
        assert_eq!(methods.len(), 2);
    }

    #[test]
    fn remove_method_matches_signature() {
        let mut methods = remover();
        let overload = MethodDescriptor::new("pay", TypeRef::Void)
            .with_param(crate::reflect::ParamDescriptor::new(TypeRef::named("int")));
        assert!(methods.remove_method(&overload));
        assert!(methods.contains("pay"));
        assert!(!methods.remove_method(&overload));
    }

    #[test]
    fn discovery_order_is_preserved() {
        let mut methods = remover();
        methods.remove_named("hideName");
        let names: Vec<_> = methods.remaining().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["getName", "pay", "pay"]);
    }
}
