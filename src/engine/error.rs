// ==========================================
// 智能库存调拨系统 - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 结构/数据错误整体失败；缺路线、退化输入不是错误
// ==========================================

use crate::config::ConfigError;
use crate::importer::ImportError;
use thiserror::Error;

/// 需求预测模型错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("训练集为空")]
    EmptyTrainingSet,

    #[error("特征与目标行数不一致: features={features}, targets={targets}")]
    LengthMismatch { features: usize, targets: usize },

    #[error("模型尚未训练")]
    NotFitted,

    #[error("模型参数非法: {0}")]
    InvalidParameter(String),
}

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("需求预测失败: {0}")]
    Forecast(#[from] ForecastError),
}

pub type EngineResult<T> = Result<T, EngineError>;
