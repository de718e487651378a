//! Cache generation (named store) operations.

use super::connection::CacheDb;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

impl CacheDb {
    /// Open a named store, creating it if it doesn't exist.
    ///
    /// Returns the store's row id.
    pub async fn open_store(&self, name: &str) -> Result<i64, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<i64, Error> {
                conn.execute(
                    "INSERT INTO cache_stores (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![name, chrono::Utc::now().to_rfc3339()],
                )?;
                let id = conn.query_row("SELECT id FROM cache_stores WHERE name = ?1", params![name], |row| row.get(0))?;
                Ok(id)
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a store's row id without creating it.
    pub async fn store_id(&self, name: &str) -> Result<Option<i64>, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<Option<i64>, Error> {
                let result = conn.query_row("SELECT id FROM cache_stores WHERE name = ?1", params![name], |row| row.get(0));

                match result {
                    Ok(id) => Ok(Some(id)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all stores in creation order.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM cache_stores ORDER BY id ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and, through the foreign key cascade, all its entries.
    ///
    /// Returns false if no store had that name.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM cache_stores WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_store_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let first = db.open_store("routine-cache-v2").await.unwrap();
        let second = db.open_store("routine-cache-v2").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(db.store_names().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_names_creation_order() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("v2").await.unwrap();
        db.open_store("v1").await.unwrap();
        db.open_store("v3").await.unwrap();
        assert_eq!(db.store_names().await.unwrap(), vec!["v2", "v1", "v3"]);
    }

    #[tokio::test]
    async fn test_store_id_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.store_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("v1").await.unwrap();

        assert!(db.delete_store("v1").await.unwrap());
        assert!(!db.delete_store("v1").await.unwrap());
        assert!(db.store_names().await.unwrap().is_empty());
    }
}
