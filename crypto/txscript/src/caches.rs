use indexmap::IndexMap;
use parking_lot::RwLock;
use rand::Rng;
use std::{
    collections::hash_map::RandomState,
    hash::{BuildHasher, Hash},
    sync::Arc,
};

/// A bounded, thread-safe memo table shared between script engines.
///
/// When full, inserting evicts a uniformly random entry. `IndexMap` makes that
/// a constant time `swap_remove_index`. A cache of size zero stores nothing.
#[derive(Clone)]
pub struct Cache<TKey: Clone + Hash + Eq + Send + Sync, TData: Clone + Send + Sync, S = RandomState> {
    map: Arc<RwLock<IndexMap<TKey, TData, S>>>,
    size: usize,
}

impl<TKey: Clone + Hash + Eq + Send + Sync, TData: Clone + Send + Sync, S: BuildHasher + Default> Cache<TKey, TData, S> {
    pub fn new(size: u64) -> Self {
        Self { map: Arc::new(RwLock::new(IndexMap::with_capacity_and_hasher(size as usize, S::default()))), size: size as usize }
    }

    pub fn get(&self, key: &TKey) -> Option<TData> {
        self.map.read().get(key).cloned()
    }

    pub fn insert(&self, key: TKey, data: TData) {
        if self.size == 0 {
            return;
        }
        let mut map = self.map.write();
        if map.len() >= self.size && !map.contains_key(&key) {
            let victim = rand::thread_rng().gen_range(0..map.len());
            map.swap_remove_index(victim);
        }
        map.insert(key, data);
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.size
    }
}
