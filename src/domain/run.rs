// ==========================================
// 智能库存调拨系统 - 运行结果领域模型
// ==========================================
// 职责: 一次完整运行的输出（批次 + 调拨单 + 诊断）
// 生命周期: 整体替换上一次运行结果，不做增量合并
// ==========================================

use crate::domain::batch::Batch;
use crate::domain::transfer::TransferOrder;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

// ==========================================
// ForecastReport - 需求预测诊断
// ==========================================
// 仅供参考，不参与流程控制
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub mse: Option<f64>, // 留出集均方误差；退化输入时为 None
    pub fallback: bool,   // true = 未训练模型，predicted_demand = expected_sales
}

// ==========================================
// TransferPlanSummary - 调拨规划统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferPlanSummary {
    pub cohorts: usize,             // 批次组总数
    pub cohorts_with_orders: usize, // 产生调拨单的批次组数
    pub donors: usize,
    pub receivers: usize,
    pub route_gaps: usize, // 因缺少有向路线而跳过的配对数
    pub unknown_expiry_batches: usize, // 效期未知、不参与调拨的批次数
    pub units_moved: i64,
}

// ==========================================
// RunOutput - 单次运行输出
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    pub run_id: String,
    pub run_at: DateTime<Local>,
    pub batches: Vec<Batch>,
    pub transfers: Vec<TransferOrder>,
    pub forecast: ForecastReport,
    pub plan_summary: TransferPlanSummary,
}
