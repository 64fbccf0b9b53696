//! Object pool and the host factory lists create items with.

use std::collections::HashMap;

use crate::stage::{ObjectData, ObjectId};

/// Creates objects for a resource url. Hosts implement this to turn a url
/// into a fully described object (size, capabilities, primitive).
pub trait ObjectFactory {
    fn create(&mut self, url: &str) -> Option<ObjectData>;
}

impl<F> ObjectFactory for F
where
    F: FnMut(&str) -> Option<ObjectData>,
{
    fn create(&mut self, url: &str) -> Option<ObjectData> {
        self(url)
    }
}

/// Detached objects waiting for reuse, keyed by resource url.
#[derive(Debug, Default)]
pub struct ObjectPool {
    objects: HashMap<String, Vec<ObjectId>>,
}

impl ObjectPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a pooled object for `url`, most recently returned first.
    pub fn get(&mut self, url: &str) -> Option<ObjectId> {
        self.objects.get_mut(url).and_then(Vec::pop)
    }

    pub fn return_object(&mut self, url: impl Into<String>, id: ObjectId) {
        self.objects.entry(url.into()).or_default().push(id);
    }

    pub fn count(&self) -> usize {
        self.objects.values().map(Vec::len).sum()
    }

    pub fn count_of(&self, url: &str) -> usize {
        self.objects.get(url).map_or(0, Vec::len)
    }

    /// Empty the pool, handing back every object it held.
    pub fn clear(&mut self) -> Vec<ObjectId> {
        self.objects.drain().flat_map(|(_, ids)| ids).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<ObjectId> {
        let mut map: SlotMap<ObjectId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn get_returns_by_url() {
        let ids = ids(3);
        let mut pool = ObjectPool::new();
        pool.return_object("ui://a", ids[0]);
        pool.return_object("ui://b", ids[1]);
        pool.return_object("ui://a", ids[2]);
        assert_eq!(pool.count(), 3);
        assert_eq!(pool.count_of("ui://a"), 2);
        assert_eq!(pool.get("ui://a"), Some(ids[2]));
        assert_eq!(pool.get("ui://b"), Some(ids[1]));
        assert_eq!(pool.get("ui://b"), None);
        assert_eq!(pool.get("ui://c"), None);
    }

    #[test]
    fn clear_hands_back_everything() {
        let ids = ids(2);
        let mut pool = ObjectPool::new();
        pool.return_object("x", ids[0]);
        pool.return_object("y", ids[1]);
        let mut out = pool.clear();
        out.sort();
        let mut expected = ids.clone();
        expected.sort();
        assert_eq!(out, expected);
        assert_eq!(pool.count(), 0);
    }

    #[test]
    fn closures_are_factories() {
        let mut factory = |url: &str| (url == "ui://row").then(|| ObjectData::new("row"));
        assert!(factory.create("ui://row").is_some());
        assert!(factory.create("ui://other").is_none());
    }
}
