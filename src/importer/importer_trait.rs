// ==========================================
// 智能库存调拨系统 - 数据加载 Trait
// ==========================================
// 职责: 定义加载管道各阶段接口（不包含实现）
// 管道: 文件解析 → 结构校验 → 字段映射
// ==========================================

use crate::domain::batch::RawBatchRecord;
use crate::domain::transfer::Route;
use crate::importer::error::ImportResult;
use std::collections::HashMap;
use std::path::Path;

/// 原始行记录（列名 → 去空白后的值）
pub type RawRow = HashMap<String, String>;

// ==========================================
// ParsedTable - 解析后的表格
// ==========================================
// headers 单独保留：空表也要能做结构校验
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为表头 + 原始行记录
    ///
    /// # 返回
    /// - Ok(ParsedTable): 表头与行记录（已跳过全空行）
    /// - Err: 文件读取错误、格式错误
    fn parse_table(&self, file_path: &Path) -> ImportResult<ParsedTable>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 字段映射与类型转换（阶段 2）
// 前置: 表头已通过结构校验并完成别名归一
pub trait FieldMapper: Send + Sync {
    /// 将库存原始行映射为 RawBatchRecord
    ///
    /// # 参数
    /// - row: 原始行记录
    /// - row_number: 数据行号（用于错误定位）
    fn map_inventory_row(&self, row: &RawRow, row_number: usize) -> ImportResult<RawBatchRecord>;

    /// 将距离表原始行映射为 Route
    fn map_route_row(&self, row: &RawRow, row_number: usize) -> ImportResult<Route>;
}
