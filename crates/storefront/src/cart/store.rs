//! Persisted cart identity.
//!
//! Only the cart id survives a restart. It lives in a small JSON document
//! under a fixed namespace key:
//!
//! ```json
//! { "packon-cart": { "cart_id": "gid://shopify/Cart/...", "saved_at": "2026-01-05T12:00:00Z" } }
//! ```

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use packon_core::CartId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Namespace key the cart id is stored under.
pub const CART_STORAGE_KEY: &str = "packon-cart";

/// Errors writing the persisted identity.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("cart store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cart store encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable home for the active cart id.
#[async_trait]
pub trait CartIdentityStore: Send + Sync {
    /// The persisted cart id, if any.
    async fn load(&self) -> Result<Option<CartId>, StorageError>;

    /// Persist `cart_id`, replacing any previous id.
    async fn save(&self, cart_id: &CartId) -> Result<(), StorageError>;

    /// Forget the persisted id.
    async fn clear(&self) -> Result<(), StorageError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCart {
    cart_id: CartId,
    saved_at: DateTime<Utc>,
}

// Sibling namespaces are kept as raw JSON, whatever their shape.
type Document = BTreeMap<String, serde_json::Value>;

/// Cart identity stored in a JSON file.
///
/// Other namespaces in the same document are preserved. A missing or
/// unreadable file loads as "no id"; the next add creates a fresh cart.
#[derive(Debug)]
pub struct FileCartIdentityStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileCartIdentityStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_document(&self) -> Document {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Document::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cart store unreadable, ignoring");
                return Document::new();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "Cart store corrupt, ignoring");
            Document::new()
        })
    }

    async fn write_document(&self, document: &Document) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl CartIdentityStore for FileCartIdentityStore {
    async fn load(&self) -> Result<Option<CartId>, StorageError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await;
        let Some(entry) = document.remove(CART_STORAGE_KEY) else {
            return Ok(None);
        };
        match serde_json::from_value::<StoredCart>(entry) {
            Ok(stored) => Ok(Some(stored.cart_id)),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Stored cart entry corrupt, ignoring"
                );
                Ok(None)
            }
        }
    }

    async fn save(&self, cart_id: &CartId) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await;
        let entry = serde_json::to_value(StoredCart {
            cart_id: cart_id.clone(),
            saved_at: Utc::now(),
        })?;
        document.insert(CART_STORAGE_KEY.to_string(), entry);
        self.write_document(&document).await?;
        debug!(cart_id = %cart_id, "Persisted cart id");
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock.lock().await;
        let mut document = self.read_document().await;
        if document.remove(CART_STORAGE_KEY).is_some() {
            self.write_document(&document).await?;
            debug!("Cleared persisted cart id");
        }
        Ok(())
    }
}

/// Cart identity held in memory, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryCartIdentityStore {
    cart_id: Mutex<Option<CartId>>,
}

impl MemoryCartIdentityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already remembers `cart_id`.
    #[must_use]
    pub fn with_id(cart_id: CartId) -> Self {
        Self {
            cart_id: Mutex::new(Some(cart_id)),
        }
    }
}

#[async_trait]
impl CartIdentityStore for MemoryCartIdentityStore {
    async fn load(&self) -> Result<Option<CartId>, StorageError> {
        Ok(self.cart_id.lock().await.clone())
    }

    async fn save(&self, cart_id: &CartId) -> Result<(), StorageError> {
        *self.cart_id.lock().await = Some(cart_id.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StorageError> {
        *self.cart_id.lock().await = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCartIdentityStore::new(dir.path().join("nested/cart.json"));

        assert_eq!(store.load().await.unwrap(), None);

        store.save(&CartId::new("gid://shopify/Cart/c1")).await.unwrap();
        assert_eq!(
            store.load().await.unwrap(),
            Some(CartId::new("gid://shopify/Cart/c1"))
        );

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");

        FileCartIdentityStore::new(&path)
            .save(&CartId::new("c1"))
            .await
            .unwrap();

        let reopened = FileCartIdentityStore::new(&path);
        assert_eq!(reopened.load().await.unwrap(), Some(CartId::new("c1")));
    }

    #[tokio::test]
    async fn test_file_store_uses_namespace_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        let store = FileCartIdentityStore::new(&path);
        store.save(&CartId::new("c1")).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw[CART_STORAGE_KEY]["cart_id"], "c1");
        assert!(raw[CART_STORAGE_KEY]["saved_at"].is_string());
    }

    #[tokio::test]
    async fn test_file_store_preserves_other_namespaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(
            &path,
            r#"{"other-app": {"cart_id": "x", "saved_at": "2026-01-01T00:00:00Z"}}"#,
        )
        .unwrap();

        let store = FileCartIdentityStore::new(&path);
        store.save(&CartId::new("c1")).await.unwrap();
        store.clear().await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["other-app"]["cart_id"], "x");
        assert!(raw.get(CART_STORAGE_KEY).is_none());
    }

    #[tokio::test]
    async fn test_file_store_keeps_foreign_shaped_namespaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, r#"{"theme": "dark", "recent": [1, 2, 3]}"#).unwrap();

        let store = FileCartIdentityStore::new(&path);
        store.save(&CartId::new("c1")).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(CartId::new("c1")));

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw["recent"], serde_json::json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn test_malformed_cart_entry_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, format!(r#"{{"{CART_STORAGE_KEY}": 42, "theme": "dark"}}"#)).unwrap();

        let store = FileCartIdentityStore::new(&path);
        assert_eq!(store.load().await.unwrap(), None);

        store.save(&CartId::new("c3")).await.unwrap();
        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw[CART_STORAGE_KEY]["cart_id"], "c3");
    }

    #[tokio::test]
    async fn test_corrupt_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileCartIdentityStore::new(&path);
        assert_eq!(store.load().await.unwrap(), None);

        store.save(&CartId::new("c2")).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(CartId::new("c2")));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryCartIdentityStore::with_id(CartId::new("c1"));
        assert_eq!(store.load().await.unwrap(), Some(CartId::new("c1")));
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }
}
