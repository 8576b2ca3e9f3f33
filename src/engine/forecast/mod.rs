// ==========================================
// 智能库存调拨系统 - 需求预测
// ==========================================
// 特征: [stock, avg_daily_sales, days_to_expiry]
// 目标: expected_sales
// 模型可替换，约束只有确定性（同输入同种子 → 同输出）
// ==========================================

pub mod forecaster;
pub mod forest;
pub mod tree;

use crate::domain::batch::Batch;
use crate::engine::error::ForecastError;

pub use forecaster::DemandForecaster;
pub use forest::RandomForestRegressor;
pub use tree::RegressionTree;

pub const N_FEATURES: usize = 3;

pub type FeatureRow = [f64; N_FEATURES];

/// 特征提取
pub fn feature_row(batch: &Batch) -> FeatureRow {
    [
        batch.stock as f64,
        batch.avg_daily_sales,
        batch.days_to_expiry as f64,
    ]
}

// ==========================================
// DemandModel Trait
// ==========================================
// 实现者: RandomForestRegressor
pub trait DemandModel {
    fn fit(&mut self, features: &[FeatureRow], targets: &[f64]) -> Result<(), ForecastError>;

    fn predict(&self, features: &[FeatureRow]) -> Result<Vec<f64>, ForecastError>;
}
