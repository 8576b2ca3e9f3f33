// ==========================================
// 智能库存调拨系统 - 动态折扣引擎
// ==========================================
// unsold_ratio = max(stock - predicted_demand, 0) / stock（stock = 0 → 0）
// urgency_rel  = 1 - remaining_ratio
// urgency_abs  = max(abs_days_threshold - days_to_expiry + 1, 0) / abs_days_threshold
// urgency      = max(urgency_rel, urgency_abs)
// discount     = min(max_disc, base_discount + 0.5 * unsold_ratio * urgency)
// final_price  = unit_price * (1 - discount)
// 红线: base_discount ≤ discount ≤ max_disc；不做舍入
// ==========================================

use crate::config::PricingConfig;
use crate::domain::batch::Batch;
use tracing::instrument;

/// 折扣中间量（便于解释单行折扣来源）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountBreakdown {
    pub unsold_ratio: f64,
    pub urgency_rel: f64,
    pub urgency_abs: f64,
    pub urgency: f64,
    pub discount: f64,
}

pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// 批量定价（原地写入 discount / final_price）
    #[instrument(skip(self, batches), fields(count = batches.len()))]
    pub fn apply(&self, batches: &mut [Batch]) {
        for batch in batches.iter_mut() {
            let breakdown = self.compute_discount(
                batch.stock,
                batch.predicted_demand,
                batch.remaining_ratio,
                batch.days_to_expiry,
            );
            batch.discount = breakdown.discount;
            batch.final_price = batch.unit_price * (1.0 - breakdown.discount);
        }
    }

    pub fn compute_discount(
        &self,
        stock: i64,
        predicted_demand: f64,
        remaining_ratio: f64,
        days_to_expiry: i64,
    ) -> DiscountBreakdown {
        let cfg = &self.config;

        let unsold_ratio = if stock > 0 {
            (stock as f64 - predicted_demand).max(0.0) / stock as f64
        } else {
            0.0
        };

        let urgency_rel = 1.0 - remaining_ratio;
        let threshold = cfg.abs_days_threshold.max(1) as f64;
        let urgency_abs =
            ((cfg.abs_days_threshold - days_to_expiry + 1) as f64).max(0.0) / threshold;
        let urgency = urgency_rel.max(urgency_abs);

        // urgency_abs ≥ 0，因此 urgency ≥ 0，discount 不低于 base_discount
        let discount = (cfg.base_discount + 0.5 * unsold_ratio * urgency).min(cfg.max_disc);

        DiscountBreakdown {
            unsold_ratio,
            urgency_rel,
            urgency_abs,
            urgency,
            discount,
        }
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}
