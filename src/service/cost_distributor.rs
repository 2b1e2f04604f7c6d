use bigdecimal::{BigDecimal, Zero};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::amount;
use crate::models::{ReceivedItem, ReceivingCost};

/// 分摊结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub items: Vec<ReceivedItem>,
    pub total_quantity: BigDecimal,
    pub total_receiving_costs: BigDecimal,
    /// 每单位收货费用 (所有明细相同)
    pub cost_per_unit: BigDecimal,
}

/// 分摊请求: 一张收货单的明细 + 收货费用
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionRequest {
    #[serde(default)]
    pub items: Vec<ReceivedItem>,
    #[serde(default)]
    pub receiving_costs: Vec<ReceivingCost>,
}

/// 按实收数量分摊收货费用，返回新的明细列表 (不修改入参)
pub fn distribute(items: &[ReceivedItem], costs: &[ReceivingCost]) -> Vec<ReceivedItem> {
    distribute_with_summary(items, costs).items
}

/// 分摊并返回汇总信息
///
/// 费率 = 收货费用总额 / 实收总数量，对每个明细统一加收，与明细自身单价无关。
/// 实收总数量为 0 时费率为 0，此时每个明细的 `unit_cost` 仍被重写为基准单价
/// (`original_unit_cost`，缺省时取传入的 `unit_cost`)，并记录到
/// `original_unit_cost`，使输出满足 `unit_cost = 原单价 + 每单位收货费用`。
/// 传入的 `unit_cost` 若已含旧的分摊额，会被还原。
pub fn distribute_with_summary(items: &[ReceivedItem], costs: &[ReceivingCost]) -> Distribution {
    let total_quantity = amount::sum(items.iter().map(|i| &i.received_quantity));
    let total_receiving_costs = amount::sum(costs.iter().map(|c| &c.amount));

    let cost_per_unit = if total_quantity.is_zero() {
        if !items.is_empty() && !total_receiving_costs.is_zero() {
            tracing::warn!(
                "收货总数量为 0, 收货费用 {} 无法分摊 ({} 个明细)",
                total_receiving_costs,
                items.len()
            );
        }
        BigDecimal::zero()
    } else {
        total_receiving_costs.clone() / total_quantity.clone()
    };

    let distributed: Vec<ReceivedItem> = items
        .iter()
        .map(|item| {
            let base = item.base_unit_cost();
            let unit_cost = &base + &cost_per_unit;
            let total = &unit_cost * &item.received_quantity;

            ReceivedItem {
                // 记录基准单价，重复分摊时不会叠加
                original_unit_cost: Some(base),
                unit_cost,
                receiving_cost_per_unit: cost_per_unit.clone(),
                total_with_receiving_cost: total,
                ..item.clone()
            }
        })
        .collect();

    tracing::debug!(
        "收货费用分摊: {} 个明细, 总数量 {}, 费用总额 {}",
        distributed.len(),
        total_quantity,
        total_receiving_costs
    );

    Distribution {
        items: distributed,
        total_quantity,
        total_receiving_costs,
        cost_per_unit,
    }
}

/// 批量分摊 (各请求互不相关，并行计算)
pub fn distribute_batch(requests: &[DistributionRequest]) -> Vec<Distribution> {
    requests
        .par_iter()
        .map(|req| distribute_with_summary(&req.items, &req.receiving_costs))
        .collect()
}
