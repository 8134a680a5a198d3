#![allow(dead_code)]

use articles_feed_core::{ArticleStore, FeedPool, Namespace, NewArticle, PoolConfig};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

pub struct TestStore {
    pub store: ArticleStore,
    pub pool: FeedPool,
    pub path: PathBuf,
    _dir: TempDir,
}

pub fn test_pool_config() -> PoolConfig {
    PoolConfig {
        max_size: 4,
        min_idle: 1,
        connection_timeout: Duration::from_secs(5),
        ..PoolConfig::default()
    }
}

pub async fn open_store() -> TestStore {
    open_store_in(Namespace::main()).await
}

pub async fn open_store_in(namespace: Namespace) -> TestStore {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("feed.sqlite3");
    let pool = FeedPool::open(&path, namespace, &test_pool_config())
        .await
        .unwrap();
    TestStore {
        store: ArticleStore::new(pool.clone()),
        pool,
        path,
        _dir: dir,
    }
}

/// Creates articles one by one with a small gap so creation times differ.
pub async fn seed(store: &ArticleStore, articles: &[(&str, &str, &str)]) {
    for (title, author, body) in articles {
        store
            .create(NewArticle::new(*title, *author, *body))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
}
