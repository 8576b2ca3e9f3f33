// ==========================================
// 智能库存调拨系统 - 需求预测引擎
// ==========================================
// 流程: 种子化 80/20 留出划分 → 训练 → 全表预测 → 留出集 MSE
// 退化输入: 行数 < 2 → predicted_demand = expected_sales，不训练
// 红线: MSE 仅诊断，不影响流程
// ==========================================

use crate::config::ForecastConfig;
use crate::domain::batch::Batch;
use crate::domain::run::ForecastReport;
use crate::engine::error::ForecastError;
use crate::engine::forecast::forest::RandomForestRegressor;
use crate::engine::forecast::{feature_row, DemandModel, FeatureRow};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, instrument, warn};

/// 训练/留出划分结果（行下标）
#[derive(Debug, Clone, PartialEq)]
pub struct HoldoutSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

#[derive(Debug, Default)]
pub struct DemandForecaster;

impl DemandForecaster {
    pub fn new() -> Self {
        Self
    }

    /// 预测每行 predicted_demand（原地写入），返回诊断报告
    #[instrument(skip(self, batches, config), fields(rows = batches.len(), seed = config.seed))]
    pub fn forecast(
        &self,
        batches: &mut [Batch],
        config: &ForecastConfig,
    ) -> Result<ForecastReport, ForecastError> {
        let mut model = RandomForestRegressor::from_config(config);
        self.forecast_with(&mut model, batches, config.holdout_fraction, config.seed)
    }

    /// 使用指定模型预测
    pub fn forecast_with<M: DemandModel>(
        &self,
        model: &mut M,
        batches: &mut [Batch],
        holdout_fraction: f64,
        seed: u64,
    ) -> Result<ForecastReport, ForecastError> {
        let n = batches.len();
        if n < 2 {
            warn!(rows = n, "样本不足，predicted_demand 取 expected_sales");
            for batch in batches.iter_mut() {
                batch.predicted_demand = batch.expected_sales;
            }
            return Ok(ForecastReport {
                train_rows: n,
                test_rows: 0,
                mse: None,
                fallback: true,
            });
        }

        let features: Vec<FeatureRow> = batches.iter().map(feature_row).collect();
        let targets: Vec<f64> = batches.iter().map(|b| b.expected_sales).collect();

        let split = Self::holdout_split(n, holdout_fraction, seed);
        let train_x: Vec<FeatureRow> = split.train.iter().map(|&i| features[i]).collect();
        let train_y: Vec<f64> = split.train.iter().map(|&i| targets[i]).collect();

        model.fit(&train_x, &train_y)?;
        let predictions = model.predict(&features)?;

        for (batch, predicted) in batches.iter_mut().zip(&predictions) {
            batch.predicted_demand = predicted.max(0.0);
        }

        let mse = split
            .test
            .iter()
            .map(|&i| {
                let err = batches[i].predicted_demand - targets[i];
                err * err
            })
            .sum::<f64>()
            / split.test.len() as f64;

        info!(
            train_rows = split.train.len(),
            test_rows = split.test.len(),
            mse,
            "需求预测完成"
        );

        Ok(ForecastReport {
            train_rows: split.train.len(),
            test_rows: split.test.len(),
            mse: Some(mse),
            fallback: false,
        })
    }

    /// 种子化留出划分
    ///
    /// test 行数 = ceil(n * fraction)，限制在 [1, n-1]；要求 n ≥ 2
    pub fn holdout_split(n: usize, holdout_fraction: f64, seed: u64) -> HoldoutSplit {
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let test_size = ((n as f64 * holdout_fraction).ceil() as usize).clamp(1, n.saturating_sub(1).max(1));
        let train = indices.split_off(test_size);

        HoldoutSplit {
            train,
            test: indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(stock: i64, avg_daily_sales: f64, days_to_expiry: i64) -> Batch {
        Batch {
            run_id: "r".to_string(),
            store_id: "S1".to_string(),
            product_id: "P1".to_string(),
            product_name: "Unknown".to_string(),
            expiry_date: None,
            stock,
            shelf_life_days: 10,
            avg_daily_sales,
            unit_price: 10.0,
            days_to_expiry,
            remaining_ratio: days_to_expiry as f64 / 10.0,
            expected_sales: days_to_expiry as f64 * avg_daily_sales,
            predicted_demand: 0.0,
            discount: 0.0,
            final_price: 0.0,
            surplus: 0.0,
        }
    }

    fn table() -> Vec<Batch> {
        (0..12)
            .map(|i| batch(10 + i * 7, (i % 4) as f64 + 1.0, i % 6))
            .collect()
    }

    #[test]
    fn test_single_row_falls_back_to_expected_sales() {
        let mut batches = vec![batch(100, 5.0, 1)];

        let report = DemandForecaster::new()
            .forecast(&mut batches, &ForecastConfig::default())
            .unwrap();

        assert!(report.fallback);
        assert_eq!(report.mse, None);
        assert_eq!(batches[0].predicted_demand, 5.0);
    }

    #[test]
    fn test_empty_input_is_fallback() {
        let report = DemandForecaster::new()
            .forecast(&mut [], &ForecastConfig::default())
            .unwrap();

        assert!(report.fallback);
        assert_eq!(report.train_rows, 0);
    }

    #[test]
    fn test_split_sizes() {
        let split = DemandForecaster::holdout_split(10, 0.2, 42);
        assert_eq!(split.test.len(), 2);
        assert_eq!(split.train.len(), 8);

        // ceil(2 * 0.2) = 1
        let split = DemandForecaster::holdout_split(2, 0.2, 42);
        assert_eq!((split.train.len(), split.test.len()), (1, 1));

        // ceil(3 * 0.9) = 3 → 限制为 2
        let split = DemandForecaster::holdout_split(3, 0.9, 42);
        assert_eq!((split.train.len(), split.test.len()), (1, 2));
    }

    #[test]
    fn test_split_partitions_all_rows() {
        let split = DemandForecaster::holdout_split(17, 0.2, 42);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();

        assert_eq!(all, (0..17).collect::<Vec<_>>());
        assert_eq!(split, DemandForecaster::holdout_split(17, 0.2, 42));
    }

    #[test]
    fn test_forecast_is_deterministic_and_non_negative() {
        let config = ForecastConfig {
            n_estimators: 20,
            ..ForecastConfig::default()
        };
        let mut a = table();
        let mut b = table();

        let report_a = DemandForecaster::new().forecast(&mut a, &config).unwrap();
        let report_b = DemandForecaster::new().forecast(&mut b, &config).unwrap();

        assert_eq!(a, b);
        assert_eq!(report_a, report_b);
        assert!(!report_a.fallback);
        assert_eq!(report_a.train_rows + report_a.test_rows, 12);
        assert!(report_a.mse.unwrap() >= 0.0);
        assert!(a.iter().all(|b| b.predicted_demand >= 0.0));
    }
}
