// ==========================================
// 智能库存调拨系统 - CART 回归树
// ==========================================
// 划分准则: 最小化左右子集平方误差和（MSE）
// 每次划分遍历全部特征；阈值取相邻不同取值的中点
// 同分时保留先出现的候选（特征序号小、阈值小），保证可复现
// ==========================================

use crate::engine::error::ForecastError;
use crate::engine::forecast::{FeatureRow, N_FEATURES};

/// 节点（扁平数组存储，子节点用下标引用）
#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    cost: f64,
}

#[derive(Debug, Clone)]
pub struct RegressionTree {
    max_depth: Option<usize>,
    min_samples_split: usize,
    nodes: Vec<Node>,
}

impl RegressionTree {
    pub fn new(max_depth: Option<usize>, min_samples_split: usize) -> Self {
        Self {
            max_depth,
            min_samples_split: min_samples_split.max(2),
            nodes: Vec::new(),
        }
    }

    /// 在给定样本下标上训练（下标可以重复，用于自助采样）
    pub fn fit(
        &mut self,
        features: &[FeatureRow],
        targets: &[f64],
        sample: &[usize],
    ) -> Result<(), ForecastError> {
        if features.len() != targets.len() {
            return Err(ForecastError::LengthMismatch {
                features: features.len(),
                targets: targets.len(),
            });
        }
        if sample.is_empty() {
            return Err(ForecastError::EmptyTrainingSet);
        }

        self.nodes.clear();
        let mut indices = sample.to_vec();
        self.grow(features, targets, &mut indices, 0);
        Ok(())
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], at: usize) -> usize {
            match nodes[at] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, left).max(walk(nodes, right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    pub fn predict_one(&self, row: &FeatureRow) -> Result<f64, ForecastError> {
        if self.nodes.is_empty() {
            return Err(ForecastError::NotFitted);
        }

        let mut at = 0;
        loop {
            match self.nodes[at] {
                Node::Leaf { value } => return Ok(value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    at = if row[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    /// 递归生长，返回新节点下标
    fn grow(
        &mut self,
        features: &[FeatureRow],
        targets: &[f64],
        indices: &mut [usize],
        depth: usize,
    ) -> usize {
        let at = self.nodes.len();
        let mean = indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64;
        self.nodes.push(Node::Leaf { value: mean });

        let depth_reached = self.max_depth.map_or(false, |max| depth >= max);
        if depth_reached || indices.len() < self.min_samples_split {
            return at;
        }

        let Some(best) = Self::best_split(features, targets, indices) else {
            return at;
        };

        // 划分下标: 左侧 ≤ threshold
        indices.sort_by(|&a, &b| features[a][best.feature].total_cmp(&features[b][best.feature]));
        let split_at = indices.partition_point(|&i| features[i][best.feature] <= best.threshold);
        let (left_idx, right_idx) = indices.split_at_mut(split_at);

        let left = self.grow(features, targets, left_idx, depth + 1);
        let right = self.grow(features, targets, right_idx, depth + 1);
        self.nodes[at] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        at
    }

    fn best_split(features: &[FeatureRow], targets: &[f64], indices: &[usize]) -> Option<SplitCandidate> {
        let n = indices.len() as f64;
        let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
        let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
        let parent_cost = total_sq - total_sum * total_sum / n;

        // 纯节点不再划分
        if parent_cost <= 1e-12 {
            return None;
        }

        let mut best: Option<SplitCandidate> = None;
        let mut order = indices.to_vec();

        for feature in 0..N_FEATURES {
            order.sort_by(|&a, &b| features[a][feature].total_cmp(&features[b][feature]));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for k in 0..order.len() - 1 {
                let y = targets[order[k]];
                left_sum += y;
                left_sq += y * y;

                let here = features[order[k]][feature];
                let next = features[order[k + 1]][feature];
                if here == next {
                    continue;
                }

                let n_left = (k + 1) as f64;
                let n_right = n - n_left;
                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let cost = (left_sq - left_sum * left_sum / n_left)
                    + (right_sq - right_sum * right_sum / n_right);

                if best.map_or(true, |b| cost < b.cost) {
                    let mut threshold = (here + next) / 2.0;
                    // 相邻浮点数的中点可能舍入到 next
                    if threshold >= next {
                        threshold = here;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        cost,
                    });
                }
            }
        }

        best.filter(|b| b.cost < parent_cost)
    }
}
