// ==========================================
// 智能库存调拨系统 - 调拨规划引擎
// ==========================================
// 分组: (product_id, expiry_date)，按首次出现顺序处理，组间互不影响
// 调出方: surplus > 0 且 (remaining_ratio ≤ ratio_threshold 或 days_to_expiry ≤ days_threshold)
// 调入方: surplus < 0
// 排序: 调出方按风险分降序，调入方按 surplus 升序（稳定排序）
// 匹配: 贪心；调出方剩余过剩与调入方剩余缺口在整个组内持续扣减
// 红线: 只按有向路线精确匹配；缺路线跳过该配对，不报错
// 效期未知的批次无法确认同组，不参与调拨
// ==========================================

use crate::config::TransferConfig;
use crate::domain::batch::Batch;
use crate::domain::run::TransferPlanSummary;
use crate::domain::transfer::{RouteTable, TransferOrder};
use crate::domain::types::{BatchRole, CohortKey};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

// ==========================================
// TransferPlan - 规划结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransferPlan {
    pub orders: Vec<TransferOrder>,
    pub summary: TransferPlanSummary,
}

pub struct TransferPlanner {
    config: TransferConfig,
}

impl TransferPlanner {
    pub fn new(config: TransferConfig) -> Self {
        Self { config }
    }

    /// surplus = stock - predicted_demand
    pub fn assign_surplus(batches: &mut [Batch]) {
        for batch in batches.iter_mut() {
            batch.surplus = batch.stock as f64 - batch.predicted_demand;
        }
    }

    /// 批次角色判定
    pub fn classify(&self, batch: &Batch) -> BatchRole {
        let near_expiry = batch.remaining_ratio <= self.config.ratio_threshold
            || batch.days_to_expiry <= self.config.days_threshold;

        if batch.surplus > 0.0 && near_expiry {
            BatchRole::Donor
        } else if batch.surplus < 0.0 {
            BatchRole::Receiver
        } else {
            BatchRole::Neutral
        }
    }

    /// 风险分 = surplus * unit_price / max(days_to_expiry, 1)
    pub fn risk_score(batch: &Batch) -> f64 {
        batch.surplus * batch.unit_price / batch.days_to_expiry.max(1) as f64
    }

    /// 按首次出现顺序分组（返回行下标）
    pub fn group_cohorts(batches: &[Batch]) -> Vec<(CohortKey, Vec<usize>)> {
        let mut positions: HashMap<CohortKey, usize> = HashMap::new();
        let mut groups: Vec<(CohortKey, Vec<usize>)> = Vec::new();

        for (idx, batch) in batches.iter().enumerate() {
            let key = batch.cohort_key();
            match positions.get(&key) {
                Some(&pos) => groups[pos].1.push(idx),
                None => {
                    positions.insert(key.clone(), groups.len());
                    groups.push((key, vec![idx]));
                }
            }
        }

        groups
    }

    #[instrument(skip(self, batches, routes), fields(batches = batches.len(), routes = routes.len()))]
    pub fn plan(&self, batches: &[Batch], routes: &RouteTable, run_id: &str) -> TransferPlan {
        let mut plan = TransferPlan::default();

        for (key, members) in Self::group_cohorts(batches) {
            if key.expiry_date.is_none() {
                plan.summary.unknown_expiry_batches += members.len();
                debug!(cohort = %key, batches = members.len(), "效期未知，跳过调拨");
                continue;
            }
            plan.summary.cohorts += 1;

            let mut donors: Vec<usize> = Vec::new();
            let mut receivers: Vec<usize> = Vec::new();
            for &idx in &members {
                match self.classify(&batches[idx]) {
                    BatchRole::Donor => donors.push(idx),
                    BatchRole::Receiver => receivers.push(idx),
                    BatchRole::Neutral => {}
                }
            }
            plan.summary.donors += donors.len();
            plan.summary.receivers += receivers.len();

            if donors.is_empty() || receivers.is_empty() {
                continue;
            }

            donors.sort_by(|&a, &b| {
                Self::risk_score(&batches[b]).total_cmp(&Self::risk_score(&batches[a]))
            });
            receivers.sort_by(|&a, &b| batches[a].surplus.total_cmp(&batches[b].surplus));

            let before = plan.orders.len();
            self.match_cohort(batches, routes, run_id, &key, &donors, &receivers, &mut plan);
            if plan.orders.len() > before {
                plan.summary.cohorts_with_orders += 1;
            }
        }

        info!(
            cohorts = plan.summary.cohorts,
            orders = plan.orders.len(),
            units_moved = plan.summary.units_moved,
            route_gaps = plan.summary.route_gaps,
            unknown_expiry = plan.summary.unknown_expiry_batches,
            "调拨规划完成"
        );

        plan
    }

    /// 单组贪心匹配
    #[allow(clippy::too_many_arguments)]
    fn match_cohort(
        &self,
        batches: &[Batch],
        routes: &RouteTable,
        run_id: &str,
        key: &CohortKey,
        donors: &[usize],
        receivers: &[usize],
        plan: &mut TransferPlan,
    ) {
        let mut donor_remaining: Vec<f64> = donors.iter().map(|&d| batches[d].surplus).collect();
        let mut receiver_remaining: Vec<f64> =
            receivers.iter().map(|&r| -batches[r].surplus).collect();

        for (di, &d) in donors.iter().enumerate() {
            let donor = &batches[d];

            for (ri, &r) in receivers.iter().enumerate() {
                if donor_remaining[di] <= 0.0 {
                    break;
                }

                let quantity = donor_remaining[di].min(receiver_remaining[ri]).floor();
                if quantity <= 0.0 {
                    continue;
                }

                let receiver = &batches[r];
                let Some(distance_km) = routes.distance(&donor.store_id, &receiver.store_id)
                else {
                    plan.summary.route_gaps += 1;
                    debug!(
                        cohort = %key,
                        from_store = %donor.store_id,
                        to_store = %receiver.store_id,
                        "缺少有向路线，跳过配对"
                    );
                    continue;
                };

                donor_remaining[di] -= quantity;
                receiver_remaining[ri] -= quantity;

                let quantity = quantity as i64;
                plan.summary.units_moved += quantity;
                plan.orders.push(TransferOrder {
                    run_id: run_id.to_string(),
                    product_id: key.product_id.clone(),
                    expiry_date: key.expiry_date,
                    from_store: donor.store_id.clone(),
                    to_store: receiver.store_id.clone(),
                    quantity,
                    distance_km,
                    remaining_ratio: donor.remaining_ratio,
                    days_to_expiry: donor.days_to_expiry,
                });
            }
        }
    }
}

impl Default for TransferPlanner {
    fn default() -> Self {
        Self::new(TransferConfig::default())
    }
}
