// ==========================================
// 智能库存调拨系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::engine_config::{ConfigError, ConfigResult, EngineConfig};
use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::debug;

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const BASE_DISCOUNT: &str = "pricing.base_discount";
    pub const MAX_DISC: &str = "pricing.max_disc";
    pub const ABS_DAYS_THRESHOLD: &str = "pricing.abs_days_threshold";
    pub const RATIO_THRESHOLD: &str = "transfer.ratio_threshold";
    pub const DAYS_THRESHOLD: &str = "transfer.days_threshold";
    pub const FORECAST_SEED: &str = "forecast.seed";
    pub const HOLDOUT_FRACTION: &str = "forecast.holdout_fraction";
    pub const N_ESTIMATORS: &str = "forecast.n_estimators";
    pub const MAX_DEPTH: &str = "forecast.max_depth";
    pub const MIN_SAMPLES_SPLIT: &str = "forecast.min_samples_split";
}

// ==========================================
// EngineConfigReader Trait
// ==========================================
// 用途: 引擎所需的配置读取接口
// 实现者: ConfigManager（config_kv 表）, EngineConfig（固定参数）
#[async_trait]
pub trait EngineConfigReader: Send + Sync {
    /// 读取并校验引擎参数
    async fn load_engine_config(&self) -> ConfigResult<EngineConfig>;
}

#[async_trait]
impl EngineConfigReader for EngineConfig {
    async fn load_engine_config(&self) -> ConfigResult<EngineConfig> {
        self.validate()?;
        Ok(self.clone())
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ConfigError::ReadError(format!("锁获取失败: {}", e)))?;
            configure_sqlite_connection(&guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    pub fn get_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::ReadError(format!("锁获取失败: {}", e)))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 写入配置值（UPSERT）
    pub fn set_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ConfigError::ReadError(format!("锁获取失败: {}", e)))?;

        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;

        Ok(())
    }

    /// 读取并解析配置值；不存在时返回默认值
    fn get_parsed_or<T: FromStr>(&self, key: &str, default: T) -> ConfigResult<T> {
        match self.get_value(key)? {
            None => Ok(default),
            Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::ParseError {
                key: key.to_string(),
                value: raw,
            }),
        }
    }

    /// 组装 EngineConfig（缺省键使用默认值）
    pub fn get_engine_config(&self) -> ConfigResult<EngineConfig> {
        use config_keys::*;

        let defaults = EngineConfig::default();
        let mut config = defaults.clone();

        config.pricing.base_discount =
            self.get_parsed_or(BASE_DISCOUNT, defaults.pricing.base_discount)?;
        config.pricing.max_disc = self.get_parsed_or(MAX_DISC, defaults.pricing.max_disc)?;
        config.pricing.abs_days_threshold =
            self.get_parsed_or(ABS_DAYS_THRESHOLD, defaults.pricing.abs_days_threshold)?;

        config.transfer.ratio_threshold =
            self.get_parsed_or(RATIO_THRESHOLD, defaults.transfer.ratio_threshold)?;
        config.transfer.days_threshold =
            self.get_parsed_or(DAYS_THRESHOLD, defaults.transfer.days_threshold)?;

        config.forecast.seed = self.get_parsed_or(FORECAST_SEED, defaults.forecast.seed)?;
        config.forecast.holdout_fraction =
            self.get_parsed_or(HOLDOUT_FRACTION, defaults.forecast.holdout_fraction)?;
        config.forecast.n_estimators =
            self.get_parsed_or(N_ESTIMATORS, defaults.forecast.n_estimators)?;
        config.forecast.min_samples_split =
            self.get_parsed_or(MIN_SAMPLES_SPLIT, defaults.forecast.min_samples_split)?;
        // max_depth: 空值或 "none" 表示不限深度
        config.forecast.max_depth = match self.get_value(MAX_DEPTH)? {
            None => defaults.forecast.max_depth,
            Some(raw) if raw.trim().is_empty() || raw.trim().eq_ignore_ascii_case("none") => None,
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|_| ConfigError::ParseError {
                key: MAX_DEPTH.to_string(),
                value: raw.clone(),
            })?),
        };

        config.validate()?;
        debug!(?config, "引擎参数加载完成");
        Ok(config)
    }
}

#[async_trait]
impl EngineConfigReader for ConfigManager {
    async fn load_engine_config(&self) -> ConfigResult<EngineConfig> {
        self.get_engine_config()
    }
}
