use crate::connection::RpcAction;
use crate::core::{ClientError, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{RwLock, watch};

/// A cached server record addressed by its id
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

/// Generic keyed cache of server records
///
/// Holds every record it has been handed, keyed by id, until it is removed
/// explicitly. Each insert and each removal bumps a revision counter that
/// consumers can watch to re-render.
pub struct Store<T: Record> {
    name: &'static str,
    actions: &'static [RpcAction],
    data: RwLock<HashMap<String, T>>,
    is_fetching: AtomicBool,
    is_loaded: AtomicBool,
    revision: watch::Sender<u64>,
}

/// Keeps the `fetching` flag raised while alive
pub struct FetchingGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for FetchingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl<T: Record> Store<T> {
    pub fn new(name: &'static str, actions: &'static [RpcAction]) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            name,
            actions,
            data: RwLock::new(HashMap::new()),
            is_fetching: AtomicBool::new(false),
            is_loaded: AtomicBool::new(false),
            revision,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn supports(&self, action: RpcAction) -> bool {
        self.actions.contains(&action)
    }

    /// Fails unless this store declares `action`
    pub fn require(&self, action: RpcAction) -> Result<()> {
        if self.supports(action) {
            Ok(())
        } else {
            Err(ClientError::UnsupportedAction {
                store: self.name,
                action: action.as_str(),
            })
        }
    }

    /// Insert or replace a record by id
    pub async fn add(&self, record: T) -> T {
        let mut data = self.data.write().await;
        self.insert_locked(&mut data, record)
    }

    /// Insert or replace several records under one lock
    pub async fn add_many(&self, records: Vec<T>) -> Vec<T> {
        let mut data = self.data.write().await;
        records
            .into_iter()
            .map(|record| self.insert_locked(&mut data, record))
            .collect()
    }

    fn insert_locked(&self, data: &mut HashMap<String, T>, record: T) -> T {
        data.insert(record.id().to_string(), record.clone());
        self.bump(1);
        record
    }

    pub async fn get(&self, id: &str) -> Option<T> {
        self.data.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &str) -> Option<T> {
        let removed = self.data.write().await.remove(id);
        if removed.is_some() {
            self.bump(1);
        }
        removed
    }

    /// Remove every record matching `predicate`, returning what was removed
    pub async fn remove_where<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        let mut data = self.data.write().await;
        let keys: Vec<String> = data
            .iter()
            .filter(|(_, record)| predicate(record))
            .map(|(key, _)| key.clone())
            .collect();

        let removed: Vec<T> = keys.iter().filter_map(|key| data.remove(key)).collect();
        self.bump(removed.len() as u64);
        removed
    }

    /// Keep only records matching `predicate`, returning how many were dropped
    pub async fn retain<F>(&self, predicate: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        let mut data = self.data.write().await;
        let before = data.len();
        data.retain(|_, record| predicate(record));
        let dropped = before - data.len();
        self.bump(dropped as u64);
        dropped
    }

    /// Linear scan returning the first match
    pub async fn find_by<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.data
            .read()
            .await
            .values()
            .find(|record| predicate(record))
            .cloned()
    }

    pub async fn filter<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.data
            .read()
            .await
            .values()
            .filter(|record| predicate(record))
            .cloned()
            .collect()
    }

    pub async fn values(&self) -> Vec<T> {
        self.data.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.data.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.data.read().await.is_empty()
    }

    /// Drop every record and reset the loaded flag
    pub async fn clear(&self) {
        let mut data = self.data.write().await;
        if !data.is_empty() {
            data.clear();
            self.bump(1);
        }
        self.is_loaded.store(false, Ordering::SeqCst);
    }

    pub fn is_fetching(&self) -> bool {
        self.is_fetching.load(Ordering::SeqCst)
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded.load(Ordering::SeqCst)
    }

    pub fn set_loaded(&self) {
        self.is_loaded.store(true, Ordering::SeqCst);
    }

    /// Raise the `fetching` flag until the returned guard is dropped
    pub fn fetching(&self) -> FetchingGuard<'_> {
        self.is_fetching.store(true, Ordering::SeqCst);
        FetchingGuard {
            flag: &self.is_fetching,
        }
    }

    /// Current mutation count
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver that changes whenever the store is mutated
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self, by: u64) {
        if by > 0 {
            self.revision.send_modify(|revision| *revision += by);
        }
    }
}
