use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use super::store::KeyValueStore;
use crate::error::DocResult;

/// 内存存储 (默认后端，进程退出即丢失)
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn save(&self, key: &str, value: &Value) -> DocResult<()> {
        self.entries.insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn load(&self, key: &str) -> DocResult<Option<Value>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    async fn list(&self, prefix: &str) -> DocResult<Vec<(String, Value)>> {
        let mut found: Vec<(String, Value)> = self
            .entries
            .iter()
            .filter(|e| e.key().starts_with(prefix))
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found)
    }

    async fn delete(&self, key: &str) -> DocResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }
}
