// ==========================================
// 智能库存调拨系统 - 路线与调拨单领域模型
// ==========================================
// 职责: 门店间有向路线 + 调拨建议单
// 红线: 路线只按有向精确匹配，不假设对称
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==========================================
// Route - 门店间有向路线
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub from_store: String,
    pub to_store: String,
    pub distance_km: f64, // 单位对引擎不透明，原样透传
}

// ==========================================
// RouteTable - 路线查找表
// ==========================================
// 单次运行内不可变
// 同一 (from, to) 出现多次时保留首条
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<(String, String), f64>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_routes(routes: impl IntoIterator<Item = Route>) -> Self {
        let mut table = Self::new();
        for route in routes {
            table.insert(route);
        }
        table
    }

    /// 插入路线，返回是否为新路线
    pub fn insert(&mut self, route: Route) -> bool {
        let key = (route.from_store, route.to_store);
        if self.routes.contains_key(&key) {
            return false;
        }
        self.routes.insert(key, route.distance_km);
        true
    }

    /// 有向查找
    pub fn distance(&self, from_store: &str, to_store: &str) -> Option<f64> {
        self.routes
            .get(&(from_store.to_string(), to_store.to_string()))
            .copied()
    }

    pub fn contains(&self, from_store: &str, to_store: &str) -> bool {
        self.distance(from_store, to_store).is_some()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

// ==========================================
// TransferOrder - 调拨建议单
// ==========================================
// quantity 为正整数，上限 min(调出方剩余过剩, 调入方剩余缺口)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferOrder {
    pub run_id: String,
    pub product_id: String,
    pub expiry_date: Option<NaiveDate>,
    pub from_store: String,
    pub to_store: String,
    pub quantity: i64,
    pub distance_km: f64,
    pub remaining_ratio: f64, // 调出方剩余保质期比例
    pub days_to_expiry: i64,  // 调出方距到期天数
}
