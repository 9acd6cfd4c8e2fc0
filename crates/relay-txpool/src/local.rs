//! In-memory pending-transaction storage (spec §4.3 "local in-memory").
//!
//! Both the per-sender map and the global set live behind one mutex so a
//! concurrent reader can never observe a per-sender add without its
//! matching global add, or vice versa (spec "Atomicity").

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::TxPoolError;
use crate::storage::PendingTxStorage;

#[derive(Default)]
struct State {
    by_sender: HashMap<String, HashSet<String>>,
    global: HashSet<String>,
}

pub struct LocalPendingTxStorage {
    state: Mutex<State>,
}

impl LocalPendingTxStorage {
    pub fn new() -> Self {
        Self { state: Mutex::new(State::default()) }
    }
}

impl Default for LocalPendingTxStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PendingTxStorage for LocalPendingTxStorage {
    async fn add(&self, sender: &str, rlp_hex: &str) -> Result<(), TxPoolError> {
        let mut state = self.state.lock();
        state.by_sender.entry(sender.to_string()).or_default().insert(rlp_hex.to_string());
        state.global.insert(rlp_hex.to_string());
        Ok(())
    }

    async fn remove(&self, sender: &str, rlp_hex: &str) -> Result<(), TxPoolError> {
        let mut state = self.state.lock();
        if let Some(set) = state.by_sender.get_mut(sender) {
            set.remove(rlp_hex);
            if set.is_empty() {
                state.by_sender.remove(sender);
            }
        }
        state.global.remove(rlp_hex);
        Ok(())
    }

    async fn count(&self, sender: &str) -> Result<usize, TxPoolError> {
        let state = self.state.lock();
        Ok(state.by_sender.get(sender).map_or(0, HashSet::len))
    }

    async fn payloads(&self, sender: &str) -> Result<Vec<String>, TxPoolError> {
        let state = self.state.lock();
        Ok(state.by_sender.get(sender).map(|set| set.iter().cloned().collect()).unwrap_or_default())
    }

    async fn all_payloads(&self) -> Result<Vec<String>, TxPoolError> {
        let state = self.state.lock();
        Ok(state.global.iter().cloned().collect())
    }

    async fn clear_all(&self) -> Result<(), TxPoolError> {
        let mut state = self.state.lock();
        state.by_sender.clear();
        state.global.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_is_visible_in_both_sender_and_global_sets() {
        let storage = LocalPendingTxStorage::new();
        storage.add("0xabc", "0xdeadbeef").await.unwrap();

        assert_eq!(storage.count("0xabc").await.unwrap(), 1);
        assert_eq!(storage.all_payloads().await.unwrap(), vec!["0xdeadbeef".to_string()]);
    }

    #[tokio::test]
    async fn remove_drops_empty_sender_entry() {
        let storage = LocalPendingTxStorage::new();
        storage.add("0xabc", "0xdeadbeef").await.unwrap();
        storage.remove("0xabc", "0xdeadbeef").await.unwrap();

        assert_eq!(storage.count("0xabc").await.unwrap(), 0);
        assert!(storage.all_payloads().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_all_empties_every_sender_and_global_set() {
        let storage = LocalPendingTxStorage::new();
        storage.add("0xabc", "0x1").await.unwrap();
        storage.add("0xdef", "0x2").await.unwrap();

        storage.clear_all().await.unwrap();

        assert!(storage.all_payloads().await.unwrap().is_empty());
        assert_eq!(storage.count("0xabc").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_adds_never_desync_sender_and_global_counts() {
        use std::sync::Arc;
        let storage = Arc::new(LocalPendingTxStorage::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let storage = storage.clone();
            handles.push(tokio::spawn(async move {
                storage.add("0xabc", &format!("0x{i}")).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(storage.count("0xabc").await.unwrap(), 50);
        assert_eq!(storage.all_payloads().await.unwrap().len(), 50);
    }
}
