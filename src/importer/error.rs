// ==========================================
// 智能库存调拨系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 约定: 结构错误/数据错误均使整次运行中止，不产生部分输出
// ==========================================

use crate::domain::types::TableKind;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 结构错误 =====
    #[error("{table} 表缺少必需列: {}", .missing.join(", "))]
    SchemaError {
        table: TableKind,
        missing: Vec<String>, // 已排序
    },

    // ===== 数据错误 =====
    #[error("{table} 表数据错误 (行 {row}, 字段 {field}, 值 '{value}'): {message}")]
    DataError {
        table: TableKind,
        row: usize,
        field: String,
        value: String,
        message: String,
    },
}

impl ImportError {
    /// 缺失列集合（仅 SchemaError）
    pub fn missing_columns(&self) -> Option<&[String]> {
        match self {
            ImportError::SchemaError { missing, .. } => Some(missing),
            _ => None,
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
