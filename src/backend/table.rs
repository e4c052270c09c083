//! Id-keyed storage for backend-owned resources.

use std::collections::HashMap;

use super::traits::{BackendError, BackendResult};

/// Resources of one kind, keyed by monotonically increasing ids.
///
/// Ids start at 1 and are never reused, so a destroyed handle can only miss.
pub(crate) struct ResourceTable<T> {
    kind: &'static str,
    items: HashMap<u64, T>,
    next_id: u64,
}

impl<T> ResourceTable<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            items: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn insert(&mut self, item: T) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.insert(id, item);
        id
    }

    pub fn get(&self, id: u64) -> BackendResult<&T> {
        self.items
            .get(&id)
            .ok_or_else(|| BackendError::unknown(self.kind, id))
    }

    pub fn get_mut(&mut self, id: u64) -> BackendResult<&mut T> {
        let kind = self.kind;
        self.items
            .get_mut(&id)
            .ok_or_else(|| BackendError::unknown(kind, id))
    }

    pub fn remove(&mut self, id: u64) -> BackendResult<T> {
        self.items
            .remove(&id)
            .ok_or_else(|| BackendError::unknown(self.kind, id))
    }

    pub fn contains(&self, id: u64) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_not_reused() {
        let mut table = ResourceTable::new("mesh");
        let a = table.insert("a");
        table.remove(a).unwrap();
        let b = table.insert("b");
        assert_ne!(a, b);
        assert_eq!(
            table.get(a).unwrap_err(),
            BackendError::UnknownHandle { kind: "mesh", id: a }
        );
        assert_eq!(*table.get(b).unwrap(), "b");
        assert_eq!(table.len(), 1);
    }
}
