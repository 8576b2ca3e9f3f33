// ==========================================
// 智能库存调拨系统 - 引擎参数
// ==========================================
// 职责: 定价 / 调拨 / 预测三组参数及其默认值与校验
// 覆写顺序: 默认值 ← config_kv(global) ← 单次运行覆写
// ==========================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置值非法 (key: {key}): {message}")]
    InvalidValue { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value})")]
    ParseError { key: String, value: String },

    #[error("配置读取失败: {0}")]
    ReadError(String),
}

impl From<rusqlite::Error> for ConfigError {
    fn from(err: rusqlite::Error) -> Self {
        ConfigError::ReadError(err.to_string())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// PricingConfig - 动态折扣参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub base_discount: f64,      // 基础折扣
    pub max_disc: f64,           // 折扣上限
    pub abs_days_threshold: i64, // 绝对临期天数阈值
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_discount: 0.10,
            max_disc: 0.40,
            abs_days_threshold: 2,
        }
    }
}

// ==========================================
// TransferConfig - 调拨判定参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    pub ratio_threshold: f64, // remaining_ratio ≤ 此值视为临期
    pub days_threshold: i64,  // days_to_expiry ≤ 此值视为临期
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            ratio_threshold: 0.10,
            days_threshold: 2,
        }
    }
}

// ==========================================
// ForecastConfig - 需求预测参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub seed: u64,
    pub holdout_fraction: f64,
    pub n_estimators: usize,
    pub max_depth: Option<usize>, // None = 不限深度
    pub min_samples_split: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            holdout_fraction: 0.20,
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
        }
    }
}

// ==========================================
// EngineConfig - 引擎参数全集
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pricing: PricingConfig,
    pub transfer: TransferConfig,
    pub forecast: ForecastConfig,
}

impl EngineConfig {
    fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// 校验参数一致性
    ///
    /// # 规则
    /// - 0 ≤ base_discount ≤ max_disc ≤ 1
    /// - abs_days_threshold > 0（作为除数）
    /// - 0 < holdout_fraction < 1
    /// - n_estimators ≥ 1, min_samples_split ≥ 2
    pub fn validate(&self) -> ConfigResult<()> {
        let p = &self.pricing;
        if !(0.0..=1.0).contains(&p.max_disc) {
            return Err(Self::invalid("max_disc", format!("必须在 [0, 1] 内: {}", p.max_disc)));
        }
        if !(0.0..=p.max_disc).contains(&p.base_discount) {
            return Err(Self::invalid(
                "base_discount",
                format!("必须在 [0, max_disc={}] 内: {}", p.max_disc, p.base_discount),
            ));
        }
        if p.abs_days_threshold <= 0 {
            return Err(Self::invalid(
                "abs_days_threshold",
                format!("必须为正整数: {}", p.abs_days_threshold),
            ));
        }

        let t = &self.transfer;
        if !t.ratio_threshold.is_finite() || t.ratio_threshold < 0.0 {
            return Err(Self::invalid(
                "ratio_threshold",
                format!("必须为非负数: {}", t.ratio_threshold),
            ));
        }

        let f = &self.forecast;
        if !(f.holdout_fraction > 0.0 && f.holdout_fraction < 1.0) {
            return Err(Self::invalid(
                "holdout_fraction",
                format!("必须在 (0, 1) 内: {}", f.holdout_fraction),
            ));
        }
        if f.n_estimators == 0 {
            return Err(Self::invalid("n_estimators", "至少为 1"));
        }
        if f.min_samples_split < 2 {
            return Err(Self::invalid("min_samples_split", "至少为 2"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();

        assert_eq!(config.pricing.base_discount, 0.10);
        assert_eq!(config.pricing.max_disc, 0.40);
        assert_eq!(config.pricing.abs_days_threshold, 2);
        assert_eq!(config.transfer.ratio_threshold, 0.10);
        assert_eq!(config.transfer.days_threshold, 2);
        assert_eq!(config.forecast.seed, 42);
        assert_eq!(config.forecast.holdout_fraction, 0.20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_above_max_rejected() {
        let mut config = EngineConfig::default();
        config.pricing.base_discount = 0.5;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == "base_discount"));
    }

    #[test]
    fn test_zero_abs_days_rejected() {
        let mut config = EngineConfig::default();
        config.pricing.abs_days_threshold = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_holdout_bounds() {
        let mut config = EngineConfig::default();
        config.forecast.holdout_fraction = 1.0;
        assert!(config.validate().is_err());

        config.forecast.holdout_fraction = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"pricing": {"max_disc": 0.5}}"#).unwrap();

        assert_eq!(config.pricing.max_disc, 0.5);
        assert_eq!(config.pricing.base_discount, 0.10);
        assert_eq!(config.forecast.n_estimators, 100);
    }
}
