// ==========================================
// 智能库存调拨系统 - 随机森林回归
// ==========================================
// 自助采样（有放回，样本数 = 训练集行数）+ CART 回归树
// 预测值 = 各树预测的算术平均
// 随机源: StdRng::seed_from_u64(seed)，树按序号依次采样
// ==========================================

use crate::config::ForecastConfig;
use crate::engine::error::ForecastError;
use crate::engine::forecast::tree::RegressionTree;
use crate::engine::forecast::{DemandModel, FeatureRow};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    n_estimators: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    seed: u64,
    trees: Vec<RegressionTree>,
}

impl RandomForestRegressor {
    pub fn new(
        n_estimators: usize,
        max_depth: Option<usize>,
        min_samples_split: usize,
        seed: u64,
    ) -> Self {
        Self {
            n_estimators,
            max_depth,
            min_samples_split,
            seed,
            trees: Vec::new(),
        }
    }

    pub fn from_config(config: &ForecastConfig) -> Self {
        Self::new(
            config.n_estimators,
            config.max_depth,
            config.min_samples_split,
            config.seed,
        )
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl DemandModel for RandomForestRegressor {
    fn fit(&mut self, features: &[FeatureRow], targets: &[f64]) -> Result<(), ForecastError> {
        if features.len() != targets.len() {
            return Err(ForecastError::LengthMismatch {
                features: features.len(),
                targets: targets.len(),
            });
        }
        if features.is_empty() {
            return Err(ForecastError::EmptyTrainingSet);
        }
        if self.n_estimators == 0 {
            return Err(ForecastError::InvalidParameter(
                "n_estimators 至少为 1".to_string(),
            ));
        }

        let n = features.len();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut trees = Vec::with_capacity(self.n_estimators);

        for _ in 0..self.n_estimators {
            let sample: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let mut tree = RegressionTree::new(self.max_depth, self.min_samples_split);
            tree.fit(features, targets, &sample)?;
            trees.push(tree);
        }

        self.trees = trees;
        Ok(())
    }

    fn predict(&self, features: &[FeatureRow]) -> Result<Vec<f64>, ForecastError> {
        if self.trees.is_empty() {
            return Err(ForecastError::NotFitted);
        }

        let n_trees = self.trees.len() as f64;
        features
            .iter()
            .map(|row| {
                let mut total = 0.0;
                for tree in &self.trees {
                    total += tree.predict_one(row)?;
                }
                Ok::<f64, ForecastError>(total / n_trees)
            })
            .collect()
    }
}
