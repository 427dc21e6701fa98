//! JSON 文件存储
//!
//! 每个文档对应一个 JSON 文件，每次整体读取、整体写入。写入先落到同目录的
//! 临时文件再 rename 覆盖目标文件；同一个 store 的写操作由异步锁串行化，
//! 并发写入时最后一次写入生效，文件内容不会被交错写坏。

use std::marker::PhantomData;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// 整体读写的文档存储
#[async_trait]
pub trait DocumentStore<D>: Send + Sync
where
    D: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
{
    /// 读取文档；文件不存在时返回空文档
    async fn load(&self) -> Result<D, StoreError>;

    /// 整体覆盖写入
    async fn save(&self, document: &D) -> Result<(), StoreError>;

    /// 按原样读取 JSON，不经过文档类型；文件不存在时返回空文档的 JSON
    async fn load_raw(&self) -> Result<Value, StoreError>;

    /// 按原样写入 JSON，保留文档类型不认识的字段
    async fn save_raw(&self, value: &Value) -> Result<(), StoreError>;

    /// 在写锁内读取、修改并写回。
    ///
    /// 读取失败时从空文档开始；`mutate` 返回 `Err` 时不写入。
    async fn update<R, E, F>(&self, mutate: F) -> Result<R, E>
    where
        F: FnOnce(&mut D) -> Result<R, E> + Send,
        R: Send,
        E: From<StoreError> + Send;

    /// 读取失败（文件损坏、权限等）一律退化为空文档
    async fn load_or_default(&self) -> D {
        match self.load().await {
            Ok(document) => document,
            Err(err) => {
                warn!(error = %err, "failed to load document, using empty default");
                D::default()
            }
        }
    }
}

pub struct JsonFileStore<D> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _document: PhantomData<fn() -> D>,
}

impl<D> JsonFileStore<D>
where
    D: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _document: PhantomData,
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// 文件不存在时返回 `None`
    async fn read_text(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "document not found, using empty default");
                Ok(None)
            }
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    fn parse<T: DeserializeOwned>(&self, content: &str) -> Result<T, StoreError> {
        serde_json::from_str(content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn read(&self) -> Result<D, StoreError> {
        match self.read_text().await? {
            Some(content) => self.parse(&content),
            None => Ok(D::default()),
        }
    }

    async fn read_raw(&self) -> Result<Value, StoreError> {
        match self.read_text().await? {
            Some(content) => self.parse(&content),
            None => serde_json::to_value(D::default()).map_err(StoreError::Serialize),
        }
    }

    /// 调用方必须持有写锁
    async fn write<T>(&self, document: &T) -> Result<(), StoreError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let json = serde_json::to_string_pretty(document).map_err(StoreError::Serialize)?;
        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(write_err)?;
        }

        let temp_path = self.temp_path();
        fs::write(&temp_path, json).await.map_err(write_err)?;
        fs::rename(&temp_path, &self.path).await.map_err(write_err)?;

        debug!(path = %self.path.display(), "document written");
        Ok(())
    }
}

#[async_trait]
impl<D> DocumentStore<D> for JsonFileStore<D>
where
    D: Serialize + DeserializeOwned + Default + Send + Sync + 'static,
{
    async fn load(&self) -> Result<D, StoreError> {
        self.read().await
    }

    async fn save(&self, document: &D) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write(document).await
    }

    async fn load_raw(&self) -> Result<Value, StoreError> {
        self.read_raw().await
    }

    async fn save_raw(&self, value: &Value) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        self.write(value).await
    }

    async fn update<R, E, F>(&self, mutate: F) -> Result<R, E>
    where
        F: FnOnce(&mut D) -> Result<R, E> + Send,
        R: Send,
        E: From<StoreError> + Send,
    {
        let _guard = self.write_lock.lock().await;

        let mut document = match self.read().await {
            Ok(document) => document,
            Err(err) => {
                warn!(error = %err, "failed to load document before update, starting from empty");
                D::default()
            }
        };

        let output = mutate(&mut document)?;
        self.write(&document).await?;

        Ok(output)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use pricing::{HistoryDocument, Offer, Product, ProductsDocument};

    fn sample() -> ProductsDocument {
        let mut product = Product::new(1, "Ürün 1");
        product.offers.push(Offer::new("Firma A", 100.0, 20.0));
        ProductsDocument::new(vec![product])
    }

    #[tokio::test]
    async fn missing_file_loads_as_default() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<ProductsDocument> = JsonFileStore::new(dir.path().join("products.json"));

        assert_eq!(store.load().await.unwrap(), ProductsDocument::default());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_parse_error_but_loads_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store: JsonFileStore<ProductsDocument> = JsonFileStore::new(&path);

        assert!(matches!(store.load().await, Err(StoreError::Parse { .. })));
        assert_eq!(store.load_or_default().await, ProductsDocument::default());
    }

    #[tokio::test]
    async fn save_creates_directory_and_writes_pretty_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("products.json");
        let store: JsonFileStore<ProductsDocument> = JsonFileStore::new(&path);

        store.save(&sample()).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"products\""));
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().await.unwrap(), sample());
    }

    #[tokio::test]
    async fn raw_documents_are_stored_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<ProductsDocument> = JsonFileStore::new(dir.path().join("products.json"));
        assert_eq!(store.load_raw().await.unwrap(), serde_json::json!({ "products": [] }));

        let legacy = serde_json::json!({
            "products": [{ "id": 1, "name": "Ürün 1", "note": "x", "offers": [{ "firm": "Firma A", "price": "120" }] }]
        });
        store.save_raw(&legacy).await.unwrap();

        assert_eq!(store.load_raw().await.unwrap(), legacy);
        let typed = store.load().await.unwrap();
        assert_eq!(typed.products[0].offers[0].price, 120.0);
        assert_eq!(typed.products[0].offers[0].kdv_rate, 0.0);
    }

    #[tokio::test]
    async fn update_does_not_write_when_mutation_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store: JsonFileStore<ProductsDocument> = JsonFileStore::new(dir.path().join("products.json"));
        store.save(&sample()).await.unwrap();

        let result: Result<(), StoreError> = store
            .update(|doc: &mut ProductsDocument| {
                doc.products.clear();
                Err(StoreError::Serialize(serde_json::from_str::<u8>("x").unwrap_err()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(store.load().await.unwrap(), sample());
    }

    #[tokio::test]
    async fn update_starts_from_empty_on_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "garbage").unwrap();
        let store: JsonFileStore<HistoryDocument> = JsonFileStore::new(&path);

        let len: Result<usize, StoreError> = store.update(|doc| Ok(doc.len())).await;

        assert_eq!(len.unwrap(), 0);
        assert_eq!(store.load().await.unwrap(), HistoryDocument::default());
    }

    #[tokio::test]
    async fn concurrent_updates_are_serialized() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(JsonFileStore::<ProductsDocument>::new(
            dir.path().join("products.json"),
        ));

        let mut handles = Vec::new();
        for i in 0..20 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .update(|doc| -> Result<(), StoreError> {
                        doc.push_product(format!("Ürün {}", i));
                        Ok(())
                    })
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let doc = store.load().await.unwrap();
        assert_eq!(doc.products.len(), 20);
        let mut ids: Vec<_> = doc.products.iter().map(|p| p.id).collect();
        ids.sort();
        assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    }
}
