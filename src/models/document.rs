use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::amount::round_money;
use super::documents::{DeliveryNote, Invoice, PurchaseOrder, Receipt, Settlement};
use super::grn::GoodsReceivedNote;

/// 单据类型，同时作为存储键前缀
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    PurchaseOrder,
    DeliveryNote,
    Receipt,
    Grn,
    Settlement,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 6] = [
        DocumentKind::Invoice,
        DocumentKind::PurchaseOrder,
        DocumentKind::DeliveryNote,
        DocumentKind::Receipt,
        DocumentKind::Grn,
        DocumentKind::Settlement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::PurchaseOrder => "purchase_order",
            DocumentKind::DeliveryNote => "delivery_note",
            DocumentKind::Receipt => "receipt",
            DocumentKind::Grn => "grn",
            DocumentKind::Settlement => "settlement",
        }
    }

    /// 打印标题
    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "Invoice",
            DocumentKind::PurchaseOrder => "Purchase Order",
            DocumentKind::DeliveryNote => "Delivery Note",
            DocumentKind::Receipt => "Receipt",
            DocumentKind::Grn => "Goods Received Note",
            DocumentKind::Settlement => "Settlement",
        }
    }

    /// 存储键前缀，例如 `grn:`
    pub fn key_prefix(&self) -> String {
        format!("{}:", self.as_str())
    }

    /// 从文档ID (`{kind}:{uuid}`) 中取出类型
    pub fn from_id(id: &str) -> Option<Self> {
        id.split_once(':').and_then(|(prefix, _)| prefix.parse().ok())
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocumentKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown document kind: {}", s))
    }
}

/// 单据内容 (按 kind 区分)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocumentBody {
    Invoice(Invoice),
    PurchaseOrder(PurchaseOrder),
    DeliveryNote(DeliveryNote),
    Receipt(Receipt),
    Grn(GoodsReceivedNote),
    Settlement(Settlement),
}

impl DocumentBody {
    pub fn kind(&self) -> DocumentKind {
        match self {
            DocumentBody::Invoice(_) => DocumentKind::Invoice,
            DocumentBody::PurchaseOrder(_) => DocumentKind::PurchaseOrder,
            DocumentBody::DeliveryNote(_) => DocumentKind::DeliveryNote,
            DocumentBody::Receipt(_) => DocumentKind::Receipt,
            DocumentBody::Grn(_) => DocumentKind::Grn,
            DocumentBody::Settlement(_) => DocumentKind::Settlement,
        }
    }

    pub fn number(&self) -> &str {
        match self {
            DocumentBody::Invoice(d) => &d.number,
            DocumentBody::PurchaseOrder(d) => &d.number,
            DocumentBody::DeliveryNote(d) => &d.number,
            DocumentBody::Receipt(d) => &d.number,
            DocumentBody::Grn(d) => &d.number,
            DocumentBody::Settlement(d) => &d.number,
        }
    }

    /// 重新计算派生字段 (合计、分摊等)
    pub fn recompute(&mut self) {
        match self {
            DocumentBody::Invoice(d) => d.recompute(),
            DocumentBody::PurchaseOrder(d) => d.recompute(),
            DocumentBody::DeliveryNote(d) => d.recompute(),
            DocumentBody::Receipt(_) => {}
            DocumentBody::Grn(d) => d.recompute(),
            DocumentBody::Settlement(d) => d.recompute(),
        }
    }

    /// 表头字段 (保序)，用于导出和打印
    pub fn summary(&self) -> IndexMap<&'static str, String> {
        let mut fields = IndexMap::new();
        fields.insert("Number", self.number().to_string());

        match self {
            DocumentBody::Invoice(d) => {
                fields.insert("Date", d.date.clone());
                fields.insert("Due Date", d.due_date.clone());
                fields.insert("Customer", d.customer.name.clone());
                fields.insert("Subtotal", round_money(&d.subtotal).to_string());
                fields.insert("Discount", round_money(&d.discount).to_string());
                fields.insert("Tax Rate (%)", d.tax_rate.to_string());
                fields.insert("Tax", round_money(&d.tax_amount).to_string());
                fields.insert("Total", round_money(&d.total).to_string());
            }
            DocumentBody::PurchaseOrder(d) => {
                fields.insert("Date", d.date.clone());
                fields.insert("Supplier", d.supplier.name.clone());
                fields.insert("Delivery Date", d.delivery_date.clone());
                fields.insert("Subtotal", round_money(&d.subtotal).to_string());
                fields.insert("Tax Rate (%)", d.tax_rate.to_string());
                fields.insert("Tax", round_money(&d.tax_amount).to_string());
                fields.insert("Total", round_money(&d.total).to_string());
            }
            DocumentBody::DeliveryNote(d) => {
                fields.insert("Date", d.date.clone());
                fields.insert("Customer", d.customer.name.clone());
                fields.insert("Vehicle", d.vehicle.clone());
                fields.insert("Driver", d.driver.clone());
                fields.insert("Total Quantity", d.total_quantity.to_string());
            }
            DocumentBody::Receipt(d) => {
                fields.insert("Date", d.date.clone());
                fields.insert("Received From", d.received_from.clone());
                fields.insert("Amount", round_money(&d.amount).to_string());
                fields.insert("Payment Method", d.payment_method.clone());
                fields.insert("Reference", d.reference.clone());
                fields.insert("Invoice", d.invoice_ref.clone().unwrap_or_default());
            }
            DocumentBody::Grn(d) => {
                fields.insert("Date", d.date.clone());
                fields.insert("Supplier", d.supplier.clone());
                fields.insert("Purchase Order", d.purchase_order_ref.clone());
                fields.insert("Received By", d.received_by.clone());
                fields.insert("Total Quantity", d.total_quantity.to_string());
                fields.insert("Receiving Costs", round_money(&d.total_receiving_costs).to_string());
                fields.insert("Total Value", round_money(&d.total_value).to_string());
            }
            DocumentBody::Settlement(d) => {
                fields.insert("Date", d.date.clone());
                fields.insert("Party", d.party.name.clone());
                fields.insert("Total Credits", round_money(&d.total_credits).to_string());
                fields.insert("Total Debits", round_money(&d.total_debits).to_string());
                fields.insert("Balance", round_money(&d.balance).to_string());
            }
        }

        fields
    }
}

/// 已保存的单据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub id: String,
    pub body: DocumentBody,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredDocument {
    pub fn kind(&self) -> DocumentKind {
        self.body.kind()
    }
}
