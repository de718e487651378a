//! Cache entry CRUD operations.
//!
//! Entries are keyed by request method and URL within a store. Only GET
//! requests are ever written or matched.

use super::connection::CacheDb;
use super::hash::compute_entry_key;
use crate::Error;
use crate::http::{Headers, Request, Response};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, Row, types::Type};

const ENTRY_COLUMNS: &str = "e.status, e.headers_json, e.response_url, e.body";

fn response_from_row(row: &Row<'_>) -> rusqlite::Result<Response> {
    let status: i64 = row.get(0)?;
    let headers_json: String = row.get(1)?;
    let headers: Headers = serde_json::from_str(&headers_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    let status = u16::try_from(status)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(e)))?;
    let body: Vec<u8> = row.get(3)?;

    Ok(Response { url: row.get(2)?, status, headers, body: body.into() })
}

impl CacheDb {
    /// Store a response for a GET request, replacing any previous entry.
    ///
    /// The store is created if it doesn't exist yet. The whole write happens
    /// in one statement batch so readers never observe a partial entry.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for non-GET requests.
    pub async fn put_entry(&self, store: &str, request: &Request, response: &Response) -> Result<(), Error> {
        if !request.is_get() {
            return Err(Error::InvalidInput(format!("cannot cache {} request for {}", request.method, request.url)));
        }

        let store = store.to_string();
        let url = request.url.to_string();
        let key_hash = compute_entry_key(&request.method, &url);
        let headers_json = serde_json::to_string(&response.headers)
            .map_err(|e| Error::InvalidInput(format!("failed to serialize headers: {e}")))?;
        let response_url = response.url.clone();
        let status = i64::from(response.status);
        let body = response.body.to_vec();
        let stored_at = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT INTO cache_stores (name, created_at) VALUES (?1, ?2)
                     ON CONFLICT(name) DO NOTHING",
                    params![store, stored_at],
                )?;
                let store_id: i64 =
                    tx.query_row("SELECT id FROM cache_stores WHERE name = ?1", params![store], |row| row.get(0))?;
                tx.execute(
                    "INSERT INTO cache_entries (
                        store_id, key_hash, method, url, status, headers_json, response_url, body, stored_at
                    ) VALUES (?1, ?2, 'GET', ?3, ?4, ?5, ?6, ?7, ?8)
                    ON CONFLICT(store_id, key_hash) DO UPDATE SET
                        url = excluded.url,
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        response_url = excluded.response_url,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![store_id, key_hash, url, status, headers_json, response_url, body, stored_at],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Find the entry for a request in one store.
    ///
    /// Non-GET requests never match.
    pub async fn match_entry(&self, store: &str, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_get() {
            return Ok(None);
        }

        let store = store.to_string();
        let key_hash = compute_entry_key(&request.method, request.url.as_str());
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ENTRY_COLUMNS} FROM cache_entries e
                     JOIN cache_stores s ON s.id = e.store_id
                     WHERE s.name = ?1 AND e.key_hash = ?2"
                ))?;

                match stmt.query_row(params![store, key_hash], response_from_row) {
                    Ok(response) => Ok(Some(response)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Find the entry for a request in any store, oldest store first.
    pub async fn match_any_entry(&self, request: &Request) -> Result<Option<Response>, Error> {
        if !request.is_get() {
            return Ok(None);
        }

        let key_hash = compute_entry_key(&request.method, request.url.as_str());
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {ENTRY_COLUMNS} FROM cache_entries e
                     JOIN cache_stores s ON s.id = e.store_id
                     WHERE e.key_hash = ?1
                     ORDER BY s.id ASC
                     LIMIT 1"
                ))?;

                match stmt.query_row(params![key_hash], response_from_row) {
                    Ok(response) => Ok(Some(response)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Request URLs stored in a store, in URL order.
    ///
    /// # Errors
    ///
    /// Returns `Error::CacheMiss` if the store doesn't exist.
    pub async fn entry_urls(&self, store: &str) -> Result<Vec<String>, Error> {
        let store_id = self
            .store_id(store)
            .await?
            .ok_or_else(|| Error::CacheMiss(store.to_string()))?;

        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM cache_entries WHERE store_id = ?1 ORDER BY url ASC")?;
                let urls = stmt
                    .query_map(params![store_id], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(urls)
            })
            .await
            .map_err(Error::from)
    }
}
