// ==========================================
// 智能库存调拨系统 - 特征构建引擎
// ==========================================
// 输入: RawBatchRecord + RunContext
// 输出: Batch（days_to_expiry / remaining_ratio / expected_sales）
// 红线: 纯函数，不读系统时钟；预测/定价字段置零等待后续阶段
// ==========================================

use crate::domain::batch::{Batch, RawBatchRecord};
use crate::engine::run_context::RunContext;
use chrono::NaiveDate;
use tracing::instrument;

/// 派生特征
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFeatures {
    pub days_to_expiry: i64,
    pub remaining_ratio: f64,
    pub expected_sales: f64,
}

#[derive(Debug, Default)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn new() -> Self {
        Self
    }

    /// 批量构建
    #[instrument(skip(self, records, ctx), fields(count = records.len(), run_id = %ctx.run_id))]
    pub fn build(&self, records: &[RawBatchRecord], ctx: &RunContext) -> Vec<Batch> {
        records
            .iter()
            .map(|record| {
                let features = Self::derive(record, ctx.run_date);
                Batch {
                    run_id: ctx.run_id.clone(),
                    store_id: record.store_id.clone(),
                    product_id: record.product_id.clone(),
                    product_name: record.product_name.clone(),
                    expiry_date: record.expiry_date,
                    stock: record.stock,
                    shelf_life_days: record.shelf_life_days,
                    avg_daily_sales: record.avg_daily_sales,
                    unit_price: record.unit_price,
                    days_to_expiry: features.days_to_expiry,
                    remaining_ratio: features.remaining_ratio,
                    expected_sales: features.expected_sales,
                    predicted_demand: 0.0,
                    discount: 0.0,
                    final_price: 0.0,
                    surplus: 0.0,
                }
            })
            .collect()
    }

    /// 单行派生
    ///
    /// - days_to_expiry = max(0, expiry_date - run_date)，到期日缺失 → 0
    /// - remaining_ratio = days_to_expiry / max(shelf_life_days, 1)
    /// - expected_sales = days_to_expiry * avg_daily_sales
    pub fn derive(record: &RawBatchRecord, run_date: NaiveDate) -> DerivedFeatures {
        let days_to_expiry = Self::days_to_expiry(record.expiry_date, run_date);
        let remaining_ratio = days_to_expiry as f64 / record.shelf_life_days.max(1) as f64;
        let expected_sales = days_to_expiry as f64 * record.avg_daily_sales;

        DerivedFeatures {
            days_to_expiry,
            remaining_ratio,
            expected_sales,
        }
    }

    pub fn days_to_expiry(expiry_date: Option<NaiveDate>, run_date: NaiveDate) -> i64 {
        expiry_date
            .map(|date| (date - run_date).num_days().max(0))
            .unwrap_or(0)
    }
}
