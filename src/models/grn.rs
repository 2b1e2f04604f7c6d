use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use super::amount::{self, lenient, lenient_option};
use crate::service::cost_distributor;

/// 收货明细 (GRN 行)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedItem {
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient")]
    pub ordered_quantity: BigDecimal,
    /// 实收数量，同时也是分摊权重
    #[serde(default, deserialize_with = "lenient")]
    pub received_quantity: BigDecimal,
    #[serde(default)]
    pub unit: String,
    /// 分摊前单价
    #[serde(default, deserialize_with = "lenient_option", skip_serializing_if = "Option::is_none")]
    pub original_unit_cost: Option<BigDecimal>,
    /// 分摊后单价 = 原单价 + 每单位收货费用
    #[serde(default, deserialize_with = "lenient")]
    pub unit_cost: BigDecimal,
    #[serde(default, deserialize_with = "lenient")]
    pub receiving_cost_per_unit: BigDecimal,
    #[serde(default, deserialize_with = "lenient")]
    pub total_with_receiving_cost: BigDecimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl ReceivedItem {
    pub fn new(description: impl Into<String>, received_quantity: BigDecimal, original_unit_cost: BigDecimal) -> Self {
        Self {
            description: description.into(),
            ordered_quantity: received_quantity.clone(),
            received_quantity,
            original_unit_cost: Some(original_unit_cost),
            ..Default::default()
        }
    }

    /// 分摊基准单价: originalUnitCost ?? unitCost
    pub fn base_unit_cost(&self) -> BigDecimal {
        self.original_unit_cost
            .clone()
            .unwrap_or_else(|| self.unit_cost.clone())
    }
}

/// 收货费用 (运费、卸货费等)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivingCost {
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient")]
    pub amount: BigDecimal,
}

impl ReceivingCost {
    pub fn new(description: impl Into<String>, amount: BigDecimal) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// 收货单 (Goods Received Note)
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoodsReceivedNote {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub purchase_order_ref: String,
    #[serde(default)]
    pub received_by: String,
    #[serde(default)]
    pub items: Vec<ReceivedItem>,
    #[serde(default)]
    pub receiving_costs: Vec<ReceivingCost>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_quantity: BigDecimal,
    #[serde(default, deserialize_with = "lenient")]
    pub total_receiving_costs: BigDecimal,
    /// 含收货费用的到岸总价
    #[serde(default, deserialize_with = "lenient")]
    pub total_value: BigDecimal,
    #[serde(default)]
    pub notes: String,
}

impl GoodsReceivedNote {
    /// 重新分摊收货费用并汇总
    pub fn recompute(&mut self) {
        let distribution = cost_distributor::distribute_with_summary(&self.items, &self.receiving_costs);
        self.total_value = amount::sum(distribution.items.iter().map(|i| &i.total_with_receiving_cost));
        self.total_quantity = distribution.total_quantity;
        self.total_receiving_costs = distribution.total_receiving_costs;
        self.items = distribution.items;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn received_item_accepts_sparse_form_json() {
        let item: ReceivedItem = serde_json::from_value(json!({
            "description": "Cement 50kg",
            "receivedQuantity": "20",
            "unitCost": "",
            "batchNumber": "B-7"
        }))
        .unwrap();

        assert_eq!(item.received_quantity, BigDecimal::from(20));
        assert_eq!(item.unit_cost, BigDecimal::from(0));
        assert!(item.original_unit_cost.is_none());
        assert_eq!(item.batch_number.as_deref(), Some("B-7"));
    }

    #[test]
    fn base_unit_cost_prefers_original() {
        let mut item = ReceivedItem::new("Bolt", BigDecimal::from(1), BigDecimal::from(4));
        item.unit_cost = BigDecimal::from(9);
        assert_eq!(item.base_unit_cost(), BigDecimal::from(4));

        item.original_unit_cost = None;
        assert_eq!(item.base_unit_cost(), BigDecimal::from(9));
    }

    #[test]
    fn recompute_fills_grn_totals() {
        let mut grn = GoodsReceivedNote {
            number: "GRN-001".into(),
            items: vec![
                ReceivedItem::new("Rice", BigDecimal::from(100), BigDecimal::from(10)),
                ReceivedItem::new("Beans", BigDecimal::from(50), BigDecimal::from(15)),
            ],
            receiving_costs: vec![
                ReceivingCost::new("Transport", BigDecimal::from(100)),
                ReceivingCost::new("Offloading", BigDecimal::from(50)),
            ],
            ..Default::default()
        };

        grn.recompute();

        assert_eq!(grn.total_quantity, BigDecimal::from(150));
        assert_eq!(grn.total_receiving_costs, BigDecimal::from(150));
        assert_eq!(grn.total_value, BigDecimal::from(1900));
        assert_eq!(grn.items[0].unit_cost, BigDecimal::from(11));
        assert_eq!(grn.items[1].total_with_receiving_cost, BigDecimal::from(800));
    }

    #[test]
    fn recompute_twice_is_stable() {
        let mut grn = GoodsReceivedNote {
            items: vec![ReceivedItem::new("Rice", BigDecimal::from(10), BigDecimal::from(5))],
            receiving_costs: vec![ReceivingCost::new("Freight", BigDecimal::from(20))],
            ..Default::default()
        };

        grn.recompute();
        let first = grn.clone();
        grn.recompute();

        assert_eq!(grn, first);
        assert_eq!(grn.items[0].unit_cost, BigDecimal::from(7));
    }
}
