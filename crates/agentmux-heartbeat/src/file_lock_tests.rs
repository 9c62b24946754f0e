use super::FileLockRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn concurrent_lockers_on_the_same_path_serialize() {
    let registry = Arc::new(FileLockRegistry::new());
    let path = PathBuf::from("/tmp/agentmux-heartbeat-test.json");
    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

    let guard = registry.lock_for(&path).await;

    let registry2 = registry.clone();
    let path2 = path.clone();
    let order2 = order.clone();
    let waiter = tokio::spawn(async move {
        let _guard = registry2.lock_for(&path2).await;
        order2.lock().push("second");
    });

    tokio::time::sleep(Duration::from_millis(20)).await;
    order.lock().push("first");
    drop(guard);

    waiter.await.expect("waiter task");
    assert_eq!(*order.lock(), vec!["first", "second"]);
}

#[tokio::test]
async fn distinct_paths_do_not_contend() {
    let registry = FileLockRegistry::new();
    let a = registry.lock_for(std::path::Path::new("/tmp/a.json")).await;
    let b = registry.lock_for(std::path::Path::new("/tmp/b.json")).await;
    drop(a);
    drop(b);
}
