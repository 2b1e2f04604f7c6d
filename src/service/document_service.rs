use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::KeyValueStore;
use crate::error::{DocError, DocResult};
use crate::models::{DocumentBody, DocumentKind, StoredDocument};
use crate::service::export::{self, ExportFormat, Rendered};

/// 单据服务: 计算派生字段并读写键值存储
pub struct DocumentService {
    store: Arc<dyn KeyValueStore>,
}

impl DocumentService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 新建单据，生成ID `{kind}:{uuid}`
    pub async fn create(&self, mut body: DocumentBody) -> DocResult<StoredDocument> {
        body.recompute();

        let now = Utc::now();
        let doc = StoredDocument {
            id: format!("{}{}", body.kind().key_prefix(), Uuid::new_v4()),
            body,
            created_at: now,
            updated_at: now,
        };
        self.put(&doc).await?;

        tracing::info!("Created {} {} (number: {})", doc.kind(), doc.id, doc.body.number());
        Ok(doc)
    }

    /// 更新已有单据，类型不可变更
    pub async fn update(&self, id: &str, mut body: DocumentBody) -> DocResult<StoredDocument> {
        if DocumentKind::from_id(id) != Some(body.kind()) {
            return Err(DocError::Validation(format!(
                "document {} cannot hold a {}",
                id,
                body.kind()
            )));
        }
        let existing = self.get(id).await?;

        body.recompute();
        let doc = StoredDocument {
            id: existing.id,
            body,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        self.put(&doc).await?;

        tracing::info!("Updated {} {}", doc.kind(), doc.id);
        Ok(doc)
    }

    pub async fn get(&self, id: &str) -> DocResult<StoredDocument> {
        let value = self
            .store
            .load(id)
            .await?
            .ok_or_else(|| DocError::NotFound(format!("document {}", id)))?;
        Ok(serde_json::from_value(value)?)
    }

    /// 列出单据 (可按类型过滤)，最近修改的在前
    pub async fn list(&self, kind: Option<DocumentKind>) -> DocResult<Vec<StoredDocument>> {
        let kinds: Vec<DocumentKind> = match kind {
            Some(k) => vec![k],
            None => DocumentKind::ALL.to_vec(),
        };

        let mut docs = Vec::new();
        for k in kinds {
            for (key, value) in self.store.list(&k.key_prefix()).await? {
                match serde_json::from_value::<StoredDocument>(value) {
                    Ok(doc) => docs.push(doc),
                    Err(e) => tracing::warn!("Skipping unreadable document {}: {}", key, e),
                }
            }
        }

        docs.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(docs)
    }

    pub async fn delete(&self, id: &str) -> DocResult<()> {
        if !self.store.delete(id).await? {
            return Err(DocError::NotFound(format!("document {}", id)));
        }
        tracing::info!("Deleted {}", id);
        Ok(())
    }

    /// 导出单据
    pub async fn export(&self, id: &str, format: ExportFormat) -> DocResult<Rendered> {
        let doc = self.get(id).await?;
        let rendered = export::render(&doc, format)?;
        tracing::info!(
            "Exported {} as {} ({} bytes)",
            id,
            format.extension(),
            rendered.bytes.len()
        );
        Ok(rendered)
    }

    async fn put(&self, doc: &StoredDocument) -> DocResult<()> {
        let value = serde_json::to_value(doc)?;
        self.store.save(&doc.id, &value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{GoodsReceivedNote, Invoice, LineItem, ReceivedItem, ReceivingCost};
    use bigdecimal::BigDecimal;
    use serde_json::json;

    fn service() -> (DocumentService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (DocumentService::new(store.clone()), store)
    }

    fn grn() -> DocumentBody {
        DocumentBody::Grn(GoodsReceivedNote {
            number: "GRN-1".into(),
            items: vec![ReceivedItem::new("Rice", BigDecimal::from(10), BigDecimal::from(5))],
            receiving_costs: vec![ReceivingCost::new("Freight", BigDecimal::from(20))],
            ..Default::default()
        })
    }

    fn invoice(number: &str) -> DocumentBody {
        DocumentBody::Invoice(Invoice {
            number: number.into(),
            items: vec![LineItem::new("Work", BigDecimal::from(2), BigDecimal::from(30))],
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn create_recomputes_and_persists() {
        let (svc, store) = service();
        let doc = svc.create(grn()).await.unwrap();

        assert!(doc.id.starts_with("grn:"));
        let DocumentBody::Grn(g) = &doc.body else {
            panic!("expected grn");
        };
        assert_eq!(g.items[0].unit_cost, BigDecimal::from(7));
        assert_eq!(g.total_value, BigDecimal::from(70));

        assert_eq!(store.len(), 1);
        assert_eq!(svc.get(&doc.id).await.unwrap(), doc);
    }

    #[tokio::test]
    async fn update_keeps_created_at_and_rejects_kind_change() {
        let (svc, _) = service();
        let doc = svc.create(invoice("INV-1")).await.unwrap();

        let updated = svc.update(&doc.id, invoice("INV-1b")).await.unwrap();
        assert_eq!(updated.created_at, doc.created_at);
        assert!(updated.updated_at >= doc.updated_at);
        assert_eq!(updated.body.number(), "INV-1b");

        let err = svc.update(&doc.id, grn()).await.unwrap_err();
        assert!(matches!(err, DocError::Validation(_)));

        let err = svc.update("invoice:missing", invoice("x")).await.unwrap_err();
        assert!(matches!(err, DocError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_filters_by_kind_newest_first() {
        let (svc, _) = service();
        let a = svc.create(invoice("A")).await.unwrap();
        let _b = svc.create(invoice("B")).await.unwrap();
        svc.create(grn()).await.unwrap();
        svc.update(&a.id, invoice("A2")).await.unwrap();

        let invoices = svc.list(Some(DocumentKind::Invoice)).await.unwrap();
        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[0].id, a.id);

        assert_eq!(svc.list(None).await.unwrap().len(), 3);
        assert!(svc.list(Some(DocumentKind::Receipt)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_skips_corrupt_entries() {
        let (svc, store) = service();
        svc.create(invoice("ok")).await.unwrap();
        store.save("invoice:broken", &json!({"id": 1})).await.unwrap();

        assert_eq!(svc.list(Some(DocumentKind::Invoice)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_and_export() {
        let (svc, _) = service();
        let doc = svc.create(invoice("INV-9")).await.unwrap();

        let rendered = svc.export(&doc.id, ExportFormat::Csv).await.unwrap();
        assert_eq!(rendered.file_name, "invoice-INV-9.csv");
        assert!(String::from_utf8(rendered.bytes).unwrap().contains("Work,2,,30.00,60.00"));

        svc.delete(&doc.id).await.unwrap();
        assert!(matches!(svc.get(&doc.id).await, Err(DocError::NotFound(_))));
        assert!(matches!(svc.delete(&doc.id).await, Err(DocError::NotFound(_))));
    }
}
