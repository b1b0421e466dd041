//! Copy-on-write snapshots shared by every statement builder.
//!
//! A builder is a thin handle around an `Arc` of its data record. Each chained
//! call derives a *new* handle whose record is a copy of the current one with
//! exactly one field changed; the receiver is never touched, so
//!
//! ```ignore
//! let base = qb::update("users").set("a", 1);
//! let with_where = base.eq("id", 7);
//! // `base` still renders without a WHERE clause.
//! ```
//!
//! Fields are addressed through typed accessors (`|d| &mut d.table`) rather
//! than by name, so addressing a field that does not exist, or has the wrong
//! type, is a compile error.

use std::sync::Arc;

/// Immutable builder backed by a shared data record.
pub(crate) trait Snapshot: Sized {
    /// The plain data record this builder wraps.
    type Data: Clone;

    fn data(&self) -> &Arc<Self::Data>;

    fn from_data(data: Arc<Self::Data>) -> Self;

    /// Derive a new snapshot by editing a private copy of the record.
    fn derive(&self, edit: impl FnOnce(&mut Self::Data)) -> Self {
        let mut data = Arc::clone(self.data());
        // `self` still holds a reference, so this always copies.
        edit(Arc::make_mut(&mut data));
        Self::from_data(data)
    }

    /// Replace one field.
    fn set<V>(&self, field: impl FnOnce(&mut Self::Data) -> &mut V, value: V) -> Self {
        self.derive(|d| *field(d) = value)
    }

    /// Append one item to a sequence field.
    fn append<T>(&self, field: impl FnOnce(&mut Self::Data) -> &mut Vec<T>, item: T) -> Self {
        self.derive(|d| field(d).push(item))
    }

    /// Append several items to a sequence field, preserving their order.
    fn extend<T>(
        &self,
        field: impl FnOnce(&mut Self::Data) -> &mut Vec<T>,
        items: impl IntoIterator<Item = T>,
    ) -> Self {
        self.derive(|d| field(d).extend(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Record {
        name: String,
        tags: Vec<String>,
    }

    #[derive(Clone)]
    struct Handle {
        data: Arc<Record>,
    }

    impl Snapshot for Handle {
        type Data = Record;

        fn data(&self) -> &Arc<Record> {
            &self.data
        }

        fn from_data(data: Arc<Record>) -> Self {
            Self { data }
        }
    }

    #[test]
    fn set_leaves_original_untouched() {
        let a = Handle::from_data(Arc::default());
        let b = a.set(|d| &mut d.name, "b".to_string());
        assert_eq!(a.data.name, "");
        assert_eq!(b.data.name, "b");
    }

    #[test]
    fn append_copies_sequences() {
        let a = Handle::from_data(Arc::default()).append(|d| &mut d.tags, "x".to_string());
        let b = a.append(|d| &mut d.tags, "y".to_string());
        let c = a.append(|d| &mut d.tags, "z".to_string());
        assert_eq!(a.data.tags, vec!["x"]);
        assert_eq!(b.data.tags, vec!["x", "y"]);
        assert_eq!(c.data.tags, vec!["x", "z"]);
    }

    #[test]
    fn extend_preserves_order() {
        let a = Handle::from_data(Arc::default())
            .extend(|d| &mut d.tags, ["1", "2"].map(String::from))
            .extend(|d| &mut d.tags, ["3"].map(String::from));
        assert_eq!(a.data.tags, vec!["1", "2", "3"]);
    }
}
