use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

use super::amount::{self, lenient};

/// 往来方 (客户 / 供应商)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Party {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// 计价明细 (发票 / 采购单)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient")]
    pub quantity: BigDecimal,
    #[serde(default)]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient")]
    pub unit_price: BigDecimal,
    /// 数量 * 单价
    #[serde(default, deserialize_with = "lenient")]
    pub amount: BigDecimal,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: BigDecimal, unit_price: BigDecimal) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            ..Default::default()
        }
    }

    fn recompute(&mut self) {
        self.amount = &self.quantity * &self.unit_price;
    }
}

/// 计价明细汇总: (小计, 税额, 合计)
fn price_lines(items: &mut [LineItem], discount: &BigDecimal, tax_rate: &BigDecimal) -> (BigDecimal, BigDecimal, BigDecimal) {
    items.iter_mut().for_each(LineItem::recompute);
    let subtotal = amount::sum(items.iter().map(|i| &i.amount));
    let taxable = &subtotal - discount;
    let tax_amount = &taxable * tax_rate / BigDecimal::from(100);
    let total = taxable + &tax_amount;
    (subtotal, tax_amount, total)
}

/// 发票
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub customer: Party,
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// 税率 (百分比)
    #[serde(default, deserialize_with = "lenient")]
    pub tax_rate: BigDecimal,
    #[serde(default, deserialize_with = "lenient")]
    pub discount: BigDecimal,
    #[serde(default, deserialize_with = "lenient")]
    pub subtotal: BigDecimal,
    #[serde(default, deserialize_with = "lenient")]
    pub tax_amount: BigDecimal,
    #[serde(default, deserialize_with = "lenient")]
    pub total: BigDecimal,
    #[serde(default)]
    pub notes: String,
}

impl Invoice {
    pub fn recompute(&mut self) {
        let (subtotal, tax_amount, total) = price_lines(&mut self.items, &self.discount, &self.tax_rate);
        self.subtotal = subtotal;
        self.tax_amount = tax_amount;
        self.total = total;
    }
}

/// 采购单
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub supplier: Party,
    #[serde(default)]
    pub delivery_date: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, deserialize_with = "lenient")]
    pub tax_rate: BigDecimal,
    #[serde(default, deserialize_with = "lenient")]
    pub subtotal: BigDecimal,
    #[serde(default, deserialize_with = "lenient")]
    pub tax_amount: BigDecimal,
    #[serde(default, deserialize_with = "lenient")]
    pub total: BigDecimal,
    #[serde(default)]
    pub terms: String,
}

impl PurchaseOrder {
    pub fn recompute(&mut self) {
        let (subtotal, tax_amount, total) = price_lines(&mut self.items, &BigDecimal::zero(), &self.tax_rate);
        self.subtotal = subtotal;
        self.tax_amount = tax_amount;
        self.total = total;
    }
}

/// 送货明细 (不计价)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryItem {
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient")]
    pub quantity: BigDecimal,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

/// 送货单
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryNote {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub customer: Party,
    #[serde(default)]
    pub items: Vec<DeliveryItem>,
    #[serde(default)]
    pub vehicle: String,
    #[serde(default)]
    pub driver: String,
    #[serde(default, deserialize_with = "lenient")]
    pub total_quantity: BigDecimal,
}

impl DeliveryNote {
    pub fn recompute(&mut self) {
        self.total_quantity = amount::sum(self.items.iter().map(|i| &i.quantity));
    }
}

/// 收据
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub received_from: String,
    #[serde(default, deserialize_with = "lenient")]
    pub amount: BigDecimal,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_ref: Option<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementKind {
    #[default]
    Credit,
    Debit,
}

impl SettlementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettlementKind::Credit => "credit",
            SettlementKind::Debit => "debit",
        }
    }
}

/// 结算明细
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementLine {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: SettlementKind,
    #[serde(default, deserialize_with = "lenient")]
    pub amount: BigDecimal,
}

/// 结算单
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub party: Party,
    #[serde(default)]
    pub lines: Vec<SettlementLine>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_credits: BigDecimal,
    #[serde(default, deserialize_with = "lenient")]
    pub total_debits: BigDecimal,
    /// 贷方 - 借方
    #[serde(default, deserialize_with = "lenient")]
    pub balance: BigDecimal,
}

impl Settlement {
    pub fn recompute(&mut self) {
        let by_kind = |kind: SettlementKind| {
            amount::sum(self.lines.iter().filter(|l| l.kind == kind).map(|l| &l.amount))
        };
        let credits = by_kind(SettlementKind::Credit);
        let debits = by_kind(SettlementKind::Debit);
        self.balance = &credits - &debits;
        self.total_credits = credits;
        self.total_debits = debits;
    }
}
