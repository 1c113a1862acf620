//! Background reaper behaviour, driven by tokio's paused clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tether_pool::{BoxError, HandleFactory, KeyedPool, PoolConfig, PoolKey, from_fn};

fn counting_pool(
    config: PoolConfig,
) -> (
    KeyedPool<impl HandleFactory<Handle = String>>,
    Arc<AtomicUsize>,
) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let factory = from_fn(move |key: PoolKey| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, BoxError>(key.to_string())
        }
    });
    (KeyedPool::new(config, factory), calls)
}

#[tokio::test(start_paused = true)]
async fn test_reaper_evicts_idle_handle() {
    let config = PoolConfig::new()
        .with_ttl(Duration::from_secs(1))
        .with_sweep_interval(Duration::from_secs(1));
    let (pool, calls) = counting_pool(config);

    pool.start();
    pool.get("S1", "nova-lite").await.unwrap();
    assert_eq!(pool.active_count().await, 1);

    tokio::time::sleep(Duration::from_millis(2500)).await;

    assert_eq!(pool.active_count().await, 0);

    // The next request builds a fresh handle.
    pool.get("S1", "nova-lite").await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    pool.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_reaper_spares_recently_used_handle() {
    let config = PoolConfig::new()
        .with_ttl(Duration::from_secs(10))
        .with_sweep_interval(Duration::from_secs(1));
    let (pool, calls) = counting_pool(config);

    pool.start();
    pool.get("S1", "p").await.unwrap();
    pool.get("S2", "p").await.unwrap();

    // Keep S1 warm while S2 goes idle.
    for _ in 0..6 {
        tokio::time::sleep(Duration::from_secs(3)).await;
        pool.get("S1", "p").await.unwrap();
    }

    assert_eq!(pool.active_keys().await, vec!["S1"]);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    pool.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_sleeping_reaper_promptly() {
    let config = PoolConfig::new().with_sweep_interval(Duration::from_secs(3600));
    let (pool, _calls) = counting_pool(config);

    pool.start();
    pool.get("S1", "p").await.unwrap();

    tokio::time::timeout(Duration::from_secs(1), pool.stop())
        .await
        .expect("stop should not wait for the sweep interval");

    assert_eq!(pool.active_count().await, 0);
    assert!(!pool.is_running());
}

#[tokio::test(start_paused = true)]
async fn test_restart_sweeps_fresh_map() {
    let config = PoolConfig::new()
        .with_ttl(Duration::from_secs(1))
        .with_sweep_interval(Duration::from_secs(1));
    let (pool, _calls) = counting_pool(config);

    pool.start();
    pool.get("S1", "p").await.unwrap();
    pool.stop().await;
    assert_eq!(pool.active_count().await, 0);

    pool.start();
    pool.get("S2", "p").await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(pool.active_count().await, 0);

    pool.stop().await;
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_reaper_does_not_keep_pool_alive() {
    let dropped = Arc::new(AtomicBool::new(false));
    let flag = DropFlag(Arc::clone(&dropped));

    let factory = from_fn(move |key: PoolKey| {
        let _owned_by_factory = &flag;
        async move { Ok::<_, BoxError>(key.to_string()) }
    });
    let pool = KeyedPool::new(PoolConfig::default(), factory);
    pool.start();

    drop(pool);
    assert!(dropped.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_gets_construct_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let factory = from_fn(move |key: PoolKey| {
        let counter = Arc::clone(&counter);
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, BoxError>(key.to_string())
        }
    });
    let pool = KeyedPool::new(PoolConfig::default(), factory);

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move { pool.get("S1", "p").await.unwrap() })
        })
        .collect();

    let mut handles = Vec::new();
    for task in tasks {
        handles.push(task.await.unwrap());
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(handles.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(pool.active_count().await, 1);
}
