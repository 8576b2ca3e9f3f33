// ==========================================
// 智能库存调拨系统 - 配置层
// ==========================================
// 职责: 引擎参数管理,支持多级覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod engine_config;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager, EngineConfigReader};
pub use engine_config::{
    ConfigError, ConfigResult, EngineConfig, ForecastConfig, PricingConfig, TransferConfig,
};
