// ==========================================
// 智能库存调拨系统 - 结构校验器实现
// ==========================================
// 阶段 1: 列名别名归一 + 必需列校验
// 红线: 缺少必需列 → SchemaError，整次运行中止
// ==========================================

use crate::domain::types::TableKind;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::ParsedTable;
use std::collections::BTreeSet;
use tracing::debug;

/// 库存表必需列
pub const INVENTORY_REQUIRED_COLUMNS: &[&str] = &[
    "store_id",
    "product_id",
    "stock",
    "expiry_date",
    "shelf_life_days",
    "avg_daily_sales",
    "unit_price",
];

/// 距离表必需列
pub const DISTANCE_REQUIRED_COLUMNS: &[&str] = &["from_store", "to_store", "distance_km"];

/// 库存表别名 (别名, 标准列名)，按优先级排列
const INVENTORY_ALIASES: &[(&str, &str)] = &[("price", "unit_price"), ("MRP", "unit_price")];

/// 距离表别名
const DISTANCE_ALIASES: &[(&str, &str)] = &[("distance", "distance_km")];

pub struct SchemaValidator;

impl SchemaValidator {
    fn required_columns(table: TableKind) -> &'static [&'static str] {
        match table {
            TableKind::Inventory => INVENTORY_REQUIRED_COLUMNS,
            TableKind::Distance => DISTANCE_REQUIRED_COLUMNS,
        }
    }

    fn aliases(table: TableKind) -> &'static [(&'static str, &'static str)] {
        match table {
            TableKind::Inventory => INVENTORY_ALIASES,
            TableKind::Distance => DISTANCE_ALIASES,
        }
    }

    /// 别名归一：仅当标准列不存在时才把别名列改名为标准列
    ///
    /// 同一标准列有多个别名时，取优先级最高的一个，其余保持原样（视为额外列）。
    pub fn normalize_columns(&self, table: TableKind, parsed: &mut ParsedTable) {
        for (alias, canonical) in Self::aliases(table) {
            let has_canonical = parsed.headers.iter().any(|h| h == canonical);
            let has_alias = parsed.headers.iter().any(|h| h == alias);
            if has_canonical || !has_alias {
                continue;
            }

            debug!(table = %table, alias = %alias, canonical = %canonical, "列名别名归一");

            for header in parsed.headers.iter_mut() {
                if header == alias {
                    *header = canonical.to_string();
                }
            }
            for row in parsed.rows.iter_mut() {
                if let Some(value) = row.remove(*alias) {
                    row.insert(canonical.to_string(), value);
                }
            }
        }
    }

    /// 校验必需列，返回排序后的缺失列集合
    pub fn missing_columns(&self, table: TableKind, headers: &[String]) -> Vec<String> {
        let present: BTreeSet<&str> = headers.iter().map(String::as_str).collect();
        let missing: BTreeSet<&str> = Self::required_columns(table)
            .iter()
            .copied()
            .filter(|col| !present.contains(col))
            .collect();
        missing.into_iter().map(str::to_string).collect()
    }

    /// 归一 + 校验（加载器入口）
    pub fn normalize_and_check(&self, table: TableKind, parsed: &mut ParsedTable) -> ImportResult<()> {
        self.normalize_columns(table, parsed);

        let missing = self.missing_columns(table, &parsed.headers);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::SchemaError { table, missing })
        }
    }
}
