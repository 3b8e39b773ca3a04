use std::{io::ErrorKind, marker::PhantomData, path::PathBuf};

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};

/// A whole collection persisted as one pretty-printed JSON array.
///
/// Every mutation is load, change in memory, save. Callers that need
/// read-modify-write atomicity must serialize access themselves.
#[derive(Debug, Clone)]
pub struct JsonFile<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Missing or empty file reads as an empty collection.
    pub async fn load(&self) -> anyhow::Result<Vec<T>> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("read {}", self.path.display()));
            }
        };
        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&data).with_context(|| format!("decode {}", self.path.display()))
    }

    pub async fn save(&self, items: &[T]) -> anyhow::Result<()> {
        let body = serde_json::to_vec_pretty(items)
            .with_context(|| format!("encode {}", self.path.display()))?;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("write {}", self.path.display()))?;
        Ok(())
    }
}
