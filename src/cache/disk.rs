//! Filesystem cache storage
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/<store>/store.json        store name + creation time
//! <root>/<store>/<sha256>.entry    one JSON metadata line, then the raw body
//! ```
//!
//! An entry is committed by a single rename of a fully written temp file,
//! so concurrent writers to one identifier leave exactly one of their
//! entries behind and readers never see a half-written one.

use super::{CacheStorage, CacheStore, EntryInfo};
use crate::error::{PrecacheError, PrecacheResult};
use crate::http::Response;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;
use uuid::Uuid;

const STORE_MARKER: &str = "store.json";
const ENTRY_EXT: &str = "entry";

/// Marker written once per store directory
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreMarker {
    name: String,
    created_at: DateTime<Utc>,
}

/// Entry metadata, stored as the first line of the entry file
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DiskEntry {
    url: String,
    status: u16,
    headers: Vec<(String, String)>,
    body_len: u64,
    cached_at: DateTime<Utc>,
}

/// Storage rooted at a directory, one subdirectory per store
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn store_dir(&self, name: &str) -> PrecacheResult<PathBuf> {
        if name.trim().is_empty() {
            return Err(PrecacheError::InvalidStoreName(name.to_string()));
        }
        Ok(self.root.join(sanitize_name(name)))
    }
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn open(&self, name: &str) -> PrecacheResult<Arc<dyn CacheStore>> {
        let dir = self.store_dir(name)?;
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| PrecacheError::io(format!("creating store {}", dir.display()), e))?;

        let marker_path = dir.join(STORE_MARKER);
        if !marker_path.exists() {
            let marker = StoreMarker {
                name: name.to_string(),
                created_at: Utc::now(),
            };
            write_atomic(&marker_path, serde_json::to_string_pretty(&marker)?.as_bytes()).await?;
            debug!("Created cache store {} at {}", name, dir.display());
        }

        Ok(Arc::new(DiskStore {
            name: name.to_string(),
            dir,
        }))
    }

    async fn has(&self, name: &str) -> PrecacheResult<bool> {
        Ok(self.store_dir(name)?.join(STORE_MARKER).exists())
    }

    async fn names(&self) -> PrecacheResult<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut dirs = fs::read_dir(&self.root)
            .await
            .map_err(|e| PrecacheError::io("reading storage root", e))?;

        while let Some(entry) = dirs
            .next_entry()
            .await
            .map_err(|e| PrecacheError::io("reading storage entry", e))?
        {
            let marker_path = entry.path().join(STORE_MARKER);
            if !marker_path.exists() {
                continue;
            }
            let content = fs::read_to_string(&marker_path).await.map_err(|e| {
                PrecacheError::io(format!("reading {}", marker_path.display()), e)
            })?;
            let marker: StoreMarker = serde_json::from_str(&content)?;
            names.push(marker.name);
        }

        names.sort();
        Ok(names)
    }
}

/// A store backed by one directory
pub struct DiskStore {
    name: String,
    dir: PathBuf,
}

impl DiskStore {
    fn entry_path(&self, url: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", entry_key(url), ENTRY_EXT))
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, url: &str, response: &Response) -> PrecacheResult<()> {
        let entry = DiskEntry {
            url: url.to_string(),
            status: response.status,
            headers: response.headers.clone(),
            body_len: response.body.len() as u64,
            cached_at: Utc::now(),
        };

        let mut contents = serde_json::to_vec(&entry)?;
        contents.push(b'\n');
        contents.extend_from_slice(&response.body);

        write_atomic(&self.entry_path(url), &contents).await?;
        debug!("Stored {} in {}", url, self.name);

        Ok(())
    }

    async fn get(&self, url: &str) -> PrecacheResult<Option<Response>> {
        let path = self.entry_path(url);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read(&path)
            .await
            .map_err(|e| PrecacheError::io(format!("reading {}", path.display()), e))?;
        let (entry, body) = split_entry(url, contents)?;

        if entry.url != url {
            return Err(PrecacheError::CorruptEntry {
                url: url.to_string(),
                reason: format!("entry belongs to {}", entry.url),
            });
        }
        if body.len() as u64 != entry.body_len {
            return Err(PrecacheError::CorruptEntry {
                url: url.to_string(),
                reason: format!("expected {} body bytes, found {}", entry.body_len, body.len()),
            });
        }

        Ok(Some(Response {
            status: entry.status,
            headers: entry.headers,
            body,
            url: entry.url,
        }))
    }

    async fn entries(&self) -> PrecacheResult<Vec<EntryInfo>> {
        let mut entries = Vec::new();
        let mut files = fs::read_dir(&self.dir)
            .await
            .map_err(|e| PrecacheError::io(format!("reading store {}", self.name), e))?;

        while let Some(file) = files
            .next_entry()
            .await
            .map_err(|e| PrecacheError::io("reading store entry", e))?
        {
            let path = file.path();
            if !path.extension().is_some_and(|ext| ext == ENTRY_EXT) {
                continue;
            }

            let entry = read_header(&path).await?;
            entries.push(EntryInfo {
                url: entry.url,
                status: entry.status,
                size: entry.body_len,
                cached_at: entry.cached_at,
            });
        }

        entries.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(entries)
    }
}

/// Split an entry file into its metadata line and body
fn split_entry(url: &str, mut contents: Vec<u8>) -> PrecacheResult<(DiskEntry, Vec<u8>)> {
    let newline = contents
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| PrecacheError::CorruptEntry {
            url: url.to_string(),
            reason: "missing metadata line".to_string(),
        })?;
    let body = contents.split_off(newline + 1);
    let entry = serde_json::from_slice(&contents[..newline]).map_err(|e| {
        PrecacheError::CorruptEntry {
            url: url.to_string(),
            reason: e.to_string(),
        }
    })?;
    Ok((entry, body))
}

/// Read only the metadata line of an entry file
async fn read_header(path: &Path) -> PrecacheResult<DiskEntry> {
    let file = fs::File::open(path)
        .await
        .map_err(|e| PrecacheError::io(format!("opening {}", path.display()), e))?;
    let mut line = Vec::new();
    BufReader::new(file)
        .read_until(b'\n', &mut line)
        .await
        .map_err(|e| PrecacheError::io(format!("reading {}", path.display()), e))?;
    Ok(serde_json::from_slice(&line)?)
}

/// File stem for an identifier: hex SHA-256 of the exact bytes
fn entry_key(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

/// Sanitize a store name for use as a directory name
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}

/// Write a file via a uniquely named temp file and rename
async fn write_atomic(path: &Path, contents: &[u8]) -> PrecacheResult<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| PrecacheError::io(format!("creating {}", temp_path.display()), e))?;
    file.write_all(contents)
        .await
        .map_err(|e| PrecacheError::io(format!("writing {}", temp_path.display()), e))?;
    file.sync_all()
        .await
        .map_err(|e| PrecacheError::io(format!("syncing {}", temp_path.display()), e))?;

    fs::rename(&temp_path, path)
        .await
        .map_err(|e| PrecacheError::io(format!("renaming into {}", path.display()), e))?;

    Ok(())
}
