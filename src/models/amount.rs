use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;

/// 输入最大长度
const MAX_INPUT_LEN: usize = 512;
/// 小数位 (指数) 绝对值上限，分摊结果约 100 位精度，需能原样读回
const MAX_SCALE: i64 = 256;

/// 解析表单输入的数值，空串、非法输入或超出范围的值一律视为 0
pub fn parse_or_zero(input: &str) -> BigDecimal {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_INPUT_LEN {
        return BigDecimal::zero();
    }
    match BigDecimal::from_str(trimmed) {
        Ok(value) => {
            let (_, scale) = value.as_bigint_and_exponent();
            if scale.abs() > MAX_SCALE {
                tracing::debug!("数值超出范围, 按 0 处理: {}", trimmed);
                BigDecimal::zero()
            } else {
                value
            }
        }
        Err(_) => BigDecimal::zero(),
    }
}

/// 将任意 JSON 值转换为金额/数量
/// 数字和数字字符串按值解析，其余 (null/bool/对象/缺失) 均为 0
pub fn from_json_or_zero(value: Option<&Value>) -> BigDecimal {
    match value {
        Some(Value::Number(n)) => parse_or_zero(&n.to_string()),
        Some(Value::String(s)) => parse_or_zero(s),
        _ => BigDecimal::zero(),
    }
}

/// serde 宽松解析: 缺失、空值、非法值 -> 0
pub fn lenient<'de, D>(deserializer: D) -> Result<BigDecimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(from_json_or_zero(value.as_ref()))
}

/// serde 宽松解析 (可选字段): 缺失或 null -> None，其余按 `lenient` 规则转换
pub fn lenient_option<'de, D>(deserializer: D) -> Result<Option<BigDecimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(from_json_or_zero(Some(&v))),
    })
}

/// 金额显示用: 保留两位小数
pub fn round_money(value: &BigDecimal) -> BigDecimal {
    value.round(2).with_scale(2)
}

/// 求和
pub fn sum<'a, I>(values: I) -> BigDecimal
where
    I: IntoIterator<Item = &'a BigDecimal>,
{
    values
        .into_iter()
        .fold(BigDecimal::zero(), |acc, v| acc + v)
}
