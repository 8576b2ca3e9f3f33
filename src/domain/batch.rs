// ==========================================
// 智能库存调拨系统 - 库存批次领域模型
// ==========================================
// 职责: 库存批次的原始记录与完整派生结果
// 红线: 派生字段只能由引擎计算，不接受外部输入
// ==========================================

use crate::domain::types::CohortKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 商品名称缺省值（输入表无 product_name 列时使用）
pub const UNKNOWN_PRODUCT_NAME: &str = "Unknown";

// ==========================================
// RawBatchRecord - 导入中间结构体
// ==========================================
// 用途: 文件解析 → 字段映射 → 此结构
// 生命周期: 仅在一次运行内
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBatchRecord {
    pub store_id: String,
    pub product_id: String,
    pub product_name: String,
    pub stock: i64,
    pub expiry_date: Option<NaiveDate>, // 无法解析的到期日 → None
    pub shelf_life_days: i64,
    pub avg_daily_sales: f64,
    pub unit_price: f64,

    // 元信息
    pub row_number: usize, // 数据行号（从 1 开始，不含表头）
}

// ==========================================
// Batch - 库存批次（含全部派生字段）
// ==========================================
// 一行 = 门店 + 商品 + 到期批次
// 派生顺序: 特征 → 预测 → 定价 → 调拨
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    pub run_id: String,

    // ===== 标识 =====
    pub store_id: String,
    pub product_id: String,
    pub product_name: String,
    pub expiry_date: Option<NaiveDate>,

    // ===== 观测字段 =====
    pub stock: i64,
    pub shelf_life_days: i64,
    pub avg_daily_sales: f64,
    pub unit_price: f64,

    // ===== 特征派生 =====
    pub days_to_expiry: i64,   // max(0, expiry_date - run_date)
    pub remaining_ratio: f64,  // days_to_expiry / max(shelf_life_days, 1)
    pub expected_sales: f64,   // days_to_expiry * avg_daily_sales

    // ===== 预测派生 =====
    pub predicted_demand: f64,

    // ===== 定价派生 =====
    pub discount: f64,
    pub final_price: f64,

    // ===== 调拨派生 =====
    pub surplus: f64, // stock - predicted_demand（负数表示缺货）
}

impl Batch {
    /// 所属批次组
    pub fn cohort_key(&self) -> CohortKey {
        CohortKey {
            product_id: self.product_id.clone(),
            expiry_date: self.expiry_date,
        }
    }

    /// 还原为原始记录（用于重新派生校验）
    pub fn to_raw_record(&self, row_number: usize) -> RawBatchRecord {
        RawBatchRecord {
            store_id: self.store_id.clone(),
            product_id: self.product_id.clone(),
            product_name: self.product_name.clone(),
            stock: self.stock,
            expiry_date: self.expiry_date,
            shelf_life_days: self.shelf_life_days,
            avg_daily_sales: self.avg_daily_sales,
            unit_price: self.unit_price,
            row_number,
        }
    }
}
