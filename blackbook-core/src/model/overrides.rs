//! Optional per-level overrides that fall through to a parent level.

use std::borrow::Borrow;

/// A locally overridable value. `Inherited` means "ask the parent".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Override<T> {
    #[default]
    Inherited,
    Overridden(T),
}

impl<T> Override<T> {
    /// Set the local slot. The parent is never touched.
    pub fn set(&mut self, value: impl Into<T>) {
        *self = Override::Overridden(value.into());
    }

    /// Clear the local slot so reads fall through again.
    pub fn inherit(&mut self) {
        *self = Override::Inherited;
    }

    pub fn local(&self) -> Option<&T> {
        match self {
            Override::Inherited => None,
            Override::Overridden(value) => Some(value),
        }
    }

    pub fn is_overridden(&self) -> bool {
        matches!(self, Override::Overridden(_))
    }

    /// The local value, or else whatever the parent level resolves to.
    /// `parent` only runs when this level inherits.
    pub fn or_parent<'a, U>(&'a self, parent: impl FnOnce() -> Option<&'a U>) -> Option<&'a U>
    where
        T: Borrow<U>,
        U: ?Sized,
    {
        resolve([self], None)
            .map(<T as Borrow<U>>::borrow)
            .or_else(parent)
    }

    /// `or_parent` for small values handed out by copy.
    pub fn copied_or_parent(&self, parent: impl FnOnce() -> Option<T>) -> Option<T>
    where
        T: Copy,
    {
        resolve([self], None).copied().or_else(parent)
    }
}

impl<T> From<Option<T>> for Override<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Override::Overridden(value),
            None => Override::Inherited,
        }
    }
}

impl<T> From<Override<T>> for Option<T> {
    fn from(value: Override<T>) -> Self {
        match value {
            Override::Inherited => None,
            Override::Overridden(value) => Some(value),
        }
    }
}

/// First overridden value of `chain`, scanning from the most specific level
/// outward, or `root` when every level inherits.
pub fn resolve<'a, T: 'a>(
    chain: impl IntoIterator<Item = &'a Override<T>>,
    root: Option<&'a T>,
) -> Option<&'a T> {
    chain
        .into_iter()
        .find_map(Override::local)
        .or(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_most_specific() {
        let instance = Override::Overridden("instance");
        let master = Override::Overridden("master");
        let root = "type";

        assert_eq!(resolve([&instance, &master], Some(&root)), Some(&"instance"));
    }

    #[test]
    fn test_resolve_falls_through_to_root() {
        let instance: Override<&str> = Override::Inherited;
        let master = Override::Inherited;
        let root = "type";

        assert_eq!(resolve([&instance, &master], Some(&root)), Some(&"type"));
    }

    #[test]
    fn test_inherit_clears_local_slot() {
        let mut title: Override<&str> = Override::Inherited;
        title.set("mine");
        assert_eq!(title.local(), Some(&"mine"));

        title.inherit();
        assert_eq!(title.or_parent(|| Some(&"parent")), Some(&"parent"));
    }

    #[test]
    fn test_parent_is_only_asked_when_inheriting() {
        let title = Override::Overridden(String::from("mine"));
        let asked = std::cell::Cell::new(false);

        let resolved: Option<&str> = title.or_parent(|| {
            asked.set(true);
            Some("parent")
        });
        assert_eq!(resolved, Some("mine"));
        assert!(!asked.get());

        let public: Override<bool> = Override::Inherited;
        assert_eq!(public.copied_or_parent(|| Some(true)), Some(true));
    }
}
