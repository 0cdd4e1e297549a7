//! 本地持久化存储
//!
//! 键值语义与浏览器local storage一致：无锁外协调，后写覆盖先写。

use async_trait::async_trait;
use hms_core::{HmsError, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// 键值存储接口
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// 读取键值
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// 写入键值
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// 删除键
    async fn remove(&self, key: &str) -> Result<()>;

    /// 列出所有键
    async fn keys(&self) -> Result<Vec<String>>;
}

/// 内存存储（测试与临时会话）
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// 文件存储：磁盘上的一个JSON对象，每次修改整体重写
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStorage {
    /// 打开存储文件，文件不存在时视为空存储
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                HmsError::Storage(format!("corrupt session file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Session file {} not found, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        info!("Opened session storage at {}", path.display());
        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let content = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, content).await.map_err(|e| {
            warn!("Failed to write session file {}: {}", self.path.display(), e);
            HmsError::Storage(format!("cannot write {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl SessionStorage for FileStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        let mut next = entries.clone();
        next.insert(key.to_string(), value.to_string());
        // 写盘成功后才替换内存状态
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(key);
        self.persist(&next).await?;
        *entries = next;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_storage_last_write_wins() {
        let storage = MemoryStorage::new();
        storage.set("userId", "1").await.unwrap();
        storage.set("userId", "2").await.unwrap();
        assert_eq!(storage.get("userId").await.unwrap(), Some("2".to_string()));

        storage.remove("userId").await.unwrap();
        assert_eq!(storage.get("userId").await.unwrap(), None);
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let storage = FileStorage::open(&path).await.unwrap();
        storage.set("userId", "7").await.unwrap();
        storage.set("userName", "Asha").await.unwrap();
        storage.remove("userName").await.unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).await.unwrap();
        assert_eq!(reopened.get("userId").await.unwrap(), Some("7".to_string()));
        assert_eq!(reopened.keys().await.unwrap(), vec!["userId".to_string()]);
    }

    #[tokio::test]
    async fn test_file_storage_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let result = FileStorage::open(&path).await;
        assert!(matches!(result, Err(HmsError::Storage(_))));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let storage = FileStorage::open(&path).await.unwrap();
        storage.set("userId", "7").await.unwrap();

        // 会话文件位置被目录占用，之后的写入都会失败
        tokio::fs::remove_file(&path).await.unwrap();
        tokio::fs::create_dir(&path).await.unwrap();

        assert!(matches!(
            storage.set("userId", "9").await,
            Err(HmsError::Storage(_))
        ));
        assert!(storage.set("doctorId", "3").await.is_err());
        assert!(storage.remove("userId").await.is_err());

        assert_eq!(storage.get("userId").await.unwrap(), Some("7".to_string()));
        assert_eq!(storage.keys().await.unwrap(), vec!["userId".to_string()]);
    }
}
