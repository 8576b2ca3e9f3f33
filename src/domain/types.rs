// ==========================================
// 智能库存调拨系统 - 领域类型定义
// ==========================================
// 职责: 跨层共享的小型值类型
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 输入表类型 (Table Kind)
// ==========================================
// 用于错误报告中定位出错的输入表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableKind {
    Inventory, // 库存批次表
    Distance,  // 门店间距离表
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKind::Inventory => write!(f, "INVENTORY"),
            TableKind::Distance => write!(f, "DISTANCE"),
        }
    }
}

// ==========================================
// 批次角色 (Batch Role)
// ==========================================
// 调拨规划中的供需分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchRole {
    Donor,    // 调出方（过剩且临期）
    Receiver, // 调入方（缺货）
    Neutral,  // 不参与调拨
}

impl fmt::Display for BatchRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchRole::Donor => write!(f, "DONOR"),
            BatchRole::Receiver => write!(f, "RECEIVER"),
            BatchRole::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

// ==========================================
// 批次组键 (Cohort Key)
// ==========================================
// 同一商品 + 同一到期日的所有门店批次构成一个批次组
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CohortKey {
    pub product_id: String,
    pub expiry_date: Option<NaiveDate>,
}

impl fmt::Display for CohortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expiry_date {
            Some(date) => write!(f, "{}@{}", self.product_id, date),
            None => write!(f, "{}@UNKNOWN", self.product_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_kind_display() {
        assert_eq!(TableKind::Inventory.to_string(), "INVENTORY");
        assert_eq!(TableKind::Distance.to_string(), "DISTANCE");
    }

    #[test]
    fn test_cohort_key_display() {
        let key = CohortKey {
            product_id: "P1".to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2026, 3, 1),
        };
        assert_eq!(key.to_string(), "P1@2026-03-01");

        let unknown = CohortKey {
            product_id: "P1".to_string(),
            expiry_date: None,
        };
        assert_eq!(unknown.to_string(), "P1@UNKNOWN");
    }
}
