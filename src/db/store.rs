use async_trait::async_trait;
use serde_json::Value;

use crate::error::DocResult;

/// 键值存储接口 (替代浏览器 localStorage)
///
/// 键按命名空间组织: `grn:<uuid>`、`invoice:<uuid>` 等。
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// 写入 (存在则覆盖)
    async fn save(&self, key: &str, value: &Value) -> DocResult<()>;

    /// 读取，不存在返回 None
    async fn load(&self, key: &str) -> DocResult<Option<Value>>;

    /// 按前缀扫描，按键排序返回 (key, value)
    async fn list(&self, prefix: &str) -> DocResult<Vec<(String, Value)>>;

    /// 删除，返回是否删除了已有键
    async fn delete(&self, key: &str) -> DocResult<bool>;
}
