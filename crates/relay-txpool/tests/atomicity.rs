use std::sync::Arc;

use relay_txpool::{LocalPendingTxStorage, PendingTransactionPoolService, PendingTxStorage};

#[tokio::test]
async fn global_set_never_outpaces_per_sender_set() {
    let storage = Arc::new(LocalPendingTxStorage::new());
    let service = PendingTransactionPoolService::new(storage.clone(), true);

    service.save_transaction("0xAAA", "0x01").await.unwrap();
    service.save_transaction("0xBBB", "0x02").await.unwrap();

    let global = storage.all_payloads().await.unwrap();
    assert_eq!(global.len(), 2);
    assert_eq!(service.get_pending_count("0xaaa").await.unwrap(), 1);
    assert_eq!(service.get_pending_count("0xbbb").await.unwrap(), 1);

    service.remove_transaction("0xAAA", "0x01").await.unwrap();
    assert_eq!(service.get_pending_count("0xaaa").await.unwrap(), 0);
    assert_eq!(storage.all_payloads().await.unwrap(), vec!["0x02".to_string()]);
}

#[tokio::test]
async fn reset_only_clears_pool_state() {
    let storage = Arc::new(LocalPendingTxStorage::new());
    let service = PendingTransactionPoolService::new(storage.clone(), true);

    service.save_transaction("0xAAA", "0x01").await.unwrap();
    service.reset().await.unwrap();

    assert!(service.get_all_transactions().await.unwrap().is_empty());
}
