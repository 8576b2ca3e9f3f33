// ==========================================
// 智能库存调拨系统 - API层错误类型
// ==========================================
// 职责: 将引擎 / 仓储错误转换为用户可读的错误消息
// 红线: 结构错误必须列出缺失列；数据错误必须定位到行与列
// ==========================================

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::importer::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误（整次运行失败）
    // ==========================================
    #[error("输入表结构错误 (table={table}): 缺少列 [{}]", .missing.join(", "))]
    SchemaError { table: String, missing: Vec<String> },

    #[error("输入数据错误 (table={table}, row={row}, column={column}): {message}")]
    DataError {
        table: String,
        row: usize,
        column: String,
        message: String,
    },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 参数与计算错误
    // ==========================================
    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("需求预测失败: {0}")]
    ForecastError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl ApiError {
    /// 错误类别代码（供调用方分支处理）
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::SchemaError { .. } => "SCHEMA_ERROR",
            ApiError::DataError { .. } => "DATA_ERROR",
            ApiError::InvalidInput(_) | ApiError::ImportError(_) => "INPUT_ERROR",
            ApiError::ConfigError(_) => "CONFIG_ERROR",
            ApiError::ForecastError(_) => "FORECAST_ERROR",
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_) => "DATABASE_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::SchemaError { table, missing } => ApiError::SchemaError {
                table: table.to_string(),
                missing,
            },
            ImportError::DataError {
                table,
                row,
                field,
                value,
                message,
            } => ApiError::DataError {
                table: table.to_string(),
                row,
                column: field,
                message: format!("{} (value={:?})", message, value),
            },
            ImportError::FileNotFound(path) => ApiError::InvalidInput(format!("文件不存在: {}", path)),
            ImportError::UnsupportedFormat(ext) => {
                ApiError::InvalidInput(format!("不支持的文件格式: {}", ext))
            }
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Import(e) => e.into(),
            EngineError::Config(e) => e.into(),
            EngineError::Forecast(e) => ApiError::ForecastError(e.to_string()),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::DatabaseError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
