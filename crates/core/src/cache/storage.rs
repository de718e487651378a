//! The cache storage seam used by the worker.
//!
//! Mirrors the browser's cache storage: named stores, GET-only entries keyed
//! by URL, and store-level enumeration and deletion.

use async_trait::async_trait;

use super::connection::CacheDb;
use crate::Error;
use crate::http::{Request, Response};

/// Durable, origin-scoped key-value store of cache generations.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a store, creating it if missing.
    async fn open(&self, name: &str) -> Result<(), Error>;

    /// Store names in creation order.
    async fn keys(&self) -> Result<Vec<String>, Error>;

    /// Delete a store and everything in it. Returns false if it didn't exist.
    async fn delete(&self, name: &str) -> Result<bool, Error>;

    /// Write an entry, replacing any previous one for the same request.
    async fn put(&self, name: &str, request: &Request, response: &Response) -> Result<(), Error>;

    async fn match_in(&self, name: &str, request: &Request) -> Result<Option<Response>, Error>;

    /// Match across every store, oldest first.
    async fn match_any(&self, request: &Request) -> Result<Option<Response>, Error>;

    /// Request URLs stored in a store.
    async fn entries(&self, name: &str) -> Result<Vec<String>, Error>;
}

#[async_trait]
impl CacheStorage for CacheDb {
    async fn open(&self, name: &str) -> Result<(), Error> {
        self.open_store(name).await.map(|_| ())
    }

    async fn keys(&self) -> Result<Vec<String>, Error> {
        self.store_names().await
    }

    async fn delete(&self, name: &str) -> Result<bool, Error> {
        self.delete_store(name).await
    }

    async fn put(&self, name: &str, request: &Request, response: &Response) -> Result<(), Error> {
        self.put_entry(name, request, response).await
    }

    async fn match_in(&self, name: &str, request: &Request) -> Result<Option<Response>, Error> {
        self.match_entry(name, request).await
    }

    async fn match_any(&self, request: &Request) -> Result<Option<Response>, Error> {
        self.match_any_entry(request).await
    }

    async fn entries(&self, name: &str) -> Result<Vec<String>, Error> {
        self.entry_urls(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    async fn storage() -> Box<dyn CacheStorage> {
        Box::new(CacheDb::open_in_memory().await.unwrap())
    }

    #[tokio::test]
    async fn test_trait_object_roundtrip() {
        let storage = storage().await;
        let req = Request::get(Url::parse("https://example.com/index.html").unwrap());

        assert!(storage.keys().await.unwrap().is_empty());
        storage.open("v1").await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["v1"]);

        storage
            .put("v1", &req, &Response::new("https://example.com/index.html", 200, "home"))
            .await
            .unwrap();
        assert_eq!(storage.entries("v1").await.unwrap(), vec!["https://example.com/index.html"]);
        assert_eq!(storage.match_in("v1", &req).await.unwrap().unwrap().text(), "home");

        assert!(storage.delete("v1").await.unwrap());
        assert!(storage.keys().await.unwrap().is_empty());
    }
}
