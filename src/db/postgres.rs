use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use std::time::{Duration, Instant};

use super::store::KeyValueStore;
use crate::error::{DocError, DocResult};

/// 写入超时
const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// PostgreSQL 键值存储 (表 t_doc_store)
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 建表 (不存在时)
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS t_doc_store (
                fkey        VARCHAR(128) PRIMARY KEY,
                fvalue      TEXT NOT NULL,
                fupdatetime TIMESTAMPTZ NOT NULL
            )
            "#
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for PgStore {
    async fn save(&self, key: &str, value: &Value) -> DocResult<()> {
        let payload = serde_json::to_string(value)?;
        let start_time = Instant::now();

        let execute_result = tokio::time::timeout(
            WRITE_TIMEOUT,
            sqlx::query(
                r#"
                INSERT INTO t_doc_store (fkey, fvalue, fupdatetime)
                VALUES ($1, $2, $3)
                ON CONFLICT (fkey) DO UPDATE
                SET fvalue = EXCLUDED.fvalue,
                    fupdatetime = EXCLUDED.fupdatetime
                "#
            )
            .bind(key)
            .bind(payload)
            .bind(Utc::now())
            .execute(&self.pool)
        ).await;

        match execute_result {
            Ok(Ok(_)) => {
                tracing::debug!("✓ 保存 {} 成功, 耗时: {:?}", key, start_time.elapsed());
                Ok(())
            },
            Ok(Err(e)) => {
                tracing::error!("✗ 保存 {} 失败, 耗时: {:?}, 错误: {:?}", key, start_time.elapsed(), e);
                Err(e.into())
            },
            Err(_) => {
                tracing::error!("✗ 保存 {} 超时 (>{:?})!", key, WRITE_TIMEOUT);
                Err(DocError::Storage(format!("write of {} timed out", key)))
            }
        }
    }

    async fn load(&self, key: &str) -> DocResult<Option<Value>> {
        let raw = sqlx::query_scalar::<_, String>(
            r#"
            SELECT fvalue
            FROM t_doc_store
            WHERE fkey = $1
            "#
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        raw.map(|s| serde_json::from_str(&s))
            .transpose()
            .map_err(DocError::from)
    }

    async fn list(&self, prefix: &str) -> DocResult<Vec<(String, Value)>> {
        let rows = sqlx::query_as::<_, (String, String)>(
            r#"
            SELECT fkey, fvalue
            FROM t_doc_store
            WHERE left(fkey, length($1)) = $1
            ORDER BY fkey
            "#
        )
        .bind(prefix)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(key, raw)| Ok((key, serde_json::from_str(&raw)?)))
            .collect()
    }

    async fn delete(&self, key: &str) -> DocResult<bool> {
        let result = sqlx::query("DELETE FROM t_doc_store WHERE fkey = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
