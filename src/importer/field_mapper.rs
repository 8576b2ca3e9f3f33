// ==========================================
// 智能库存调拨系统 - 字段映射器实现
// ==========================================
// 阶段 2: 标准列 → 领域结构 + 类型转换
// 策略:
// - 到期日无法解析 → None（后续按 0 天处理，记录警告）
// - 数值字段无法解析或越界 → DataError，整次运行中止
// ==========================================

use crate::domain::batch::{RawBatchRecord, UNKNOWN_PRODUCT_NAME};
use crate::domain::transfer::Route;
use crate::domain::types::TableKind;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FieldMapper as FieldMapperTrait, RawRow};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::warn;

/// 支持的日期格式（按顺序尝试）
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d", "%d-%m-%Y"];

/// 支持的日期时间格式（取日期部分）
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

pub struct FieldMapper;

impl FieldMapperTrait for FieldMapper {
    fn map_inventory_row(&self, row: &RawRow, row_number: usize) -> ImportResult<RawBatchRecord> {
        let table = TableKind::Inventory;

        let expiry_date = match self.get_string(row, "expiry_date") {
            None => {
                warn!(row_number, "到期日缺失，按 0 天处理");
                None
            }
            Some(value) => {
                let parsed = Self::parse_date(&value);
                if parsed.is_none() {
                    warn!(row_number, value = %value, "到期日无法解析，按 0 天处理");
                }
                parsed
            }
        };

        Ok(RawBatchRecord {
            store_id: self.require_string(row, table, "store_id", row_number)?,
            product_id: self.require_string(row, table, "product_id", row_number)?,
            product_name: self
                .get_string(row, "product_name")
                .unwrap_or_else(|| UNKNOWN_PRODUCT_NAME.to_string()),
            stock: self.parse_non_negative_int(row, table, "stock", row_number)?,
            expiry_date,
            shelf_life_days: self.parse_non_negative_int(row, table, "shelf_life_days", row_number)?,
            avg_daily_sales: self.parse_non_negative_f64(row, table, "avg_daily_sales", row_number)?,
            unit_price: self.parse_non_negative_f64(row, table, "unit_price", row_number)?,
            row_number,
        })
    }

    fn map_route_row(&self, row: &RawRow, row_number: usize) -> ImportResult<Route> {
        let table = TableKind::Distance;

        Ok(Route {
            from_store: self.require_string(row, table, "from_store", row_number)?,
            to_store: self.require_string(row, table, "to_store", row_number)?,
            distance_km: self.parse_f64(row, table, "distance_km", row_number)?,
        })
    }
}

impl FieldMapper {
    /// 提取字符串字段（空白视为缺失）
    fn get_string(&self, row: &RawRow, key: &str) -> Option<String> {
        row.get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    fn data_error(
        table: TableKind,
        row: usize,
        field: &str,
        value: &str,
        message: impl Into<String>,
    ) -> ImportError {
        ImportError::DataError {
            table,
            row,
            field: field.to_string(),
            value: value.to_string(),
            message: message.into(),
        }
    }

    /// 必填字符串字段
    fn require_string(
        &self,
        row: &RawRow,
        table: TableKind,
        key: &str,
        row_number: usize,
    ) -> ImportResult<String> {
        self.get_string(row, key)
            .ok_or_else(|| Self::data_error(table, row_number, key, "", "必填字段为空"))
    }

    /// 解析浮点数（必填，必须有限）
    fn parse_f64(
        &self,
        row: &RawRow,
        table: TableKind,
        key: &str,
        row_number: usize,
    ) -> ImportResult<f64> {
        let value = self.require_string(row, table, key, row_number)?;
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            _ => Err(Self::data_error(
                table,
                row_number,
                key,
                &value,
                "无法解析为浮点数",
            )),
        }
    }

    /// 解析非负浮点数
    fn parse_non_negative_f64(
        &self,
        row: &RawRow,
        table: TableKind,
        key: &str,
        row_number: usize,
    ) -> ImportResult<f64> {
        let v = self.parse_f64(row, table, key, row_number)?;
        if v < 0.0 {
            return Err(Self::data_error(
                table,
                row_number,
                key,
                &v.to_string(),
                "数值不能为负数",
            ));
        }
        Ok(v)
    }

    /// 解析非负整数（兼容 "100.0" 这类整值浮点写法）
    fn parse_non_negative_int(
        &self,
        row: &RawRow,
        table: TableKind,
        key: &str,
        row_number: usize,
    ) -> ImportResult<i64> {
        let value = self.require_string(row, table, key, row_number)?;

        let parsed = value.parse::<i64>().ok().or_else(|| {
            value
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        });

        match parsed {
            None => Err(Self::data_error(
                table,
                row_number,
                key,
                &value,
                "无法解析为整数",
            )),
            Some(v) if v < 0 => Err(Self::data_error(
                table,
                row_number,
                key,
                &value,
                "数值不能为负数",
            )),
            Some(v) => Ok(v),
        }
    }

    /// 解析日期（多格式兼容），失败返回 None
    pub fn parse_date(value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
            .or_else(|| {
                DATETIME_FORMATS
                    .iter()
                    .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                    .map(|dt| dt.date())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory_row() -> RawRow {
        let mut row = RawRow::new();
        row.insert("store_id".to_string(), "S1".to_string());
        row.insert("product_id".to_string(), "P1".to_string());
        row.insert("stock".to_string(), "100".to_string());
        row.insert("expiry_date".to_string(), "2026-03-01".to_string());
        row.insert("shelf_life_days".to_string(), "10".to_string());
        row.insert("avg_daily_sales".to_string(), "5".to_string());
        row.insert("unit_price".to_string(), "10".to_string());
        row
    }

    #[test]
    fn test_map_inventory_row_basic() {
        let record = FieldMapper.map_inventory_row(&inventory_row(), 1).unwrap();

        assert_eq!(record.store_id, "S1");
        assert_eq!(record.stock, 100);
        assert_eq!(record.expiry_date, NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(record.shelf_life_days, 10);
        assert_eq!(record.unit_price, 10.0);
        assert_eq!(record.product_name, UNKNOWN_PRODUCT_NAME);
        assert_eq!(record.row_number, 1);
    }

    #[test]
    fn test_product_name_carried_when_present() {
        let mut row = inventory_row();
        row.insert("product_name".to_string(), "Milk 1L".to_string());

        let record = FieldMapper.map_inventory_row(&row, 1).unwrap();

        assert_eq!(record.product_name, "Milk 1L");
    }

    #[test]
    fn test_unparsable_expiry_becomes_none() {
        let mut row = inventory_row();
        row.insert("expiry_date".to_string(), "not-a-date".to_string());

        let record = FieldMapper.map_inventory_row(&row, 1).unwrap();

        assert_eq!(record.expiry_date, None);
    }

    #[test]
    fn test_expiry_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 1);
        assert_eq!(FieldMapper::parse_date("20260301"), expected);
        assert_eq!(FieldMapper::parse_date("2026/03/01"), expected);
        assert_eq!(FieldMapper::parse_date("01-03-2026"), expected);
        assert_eq!(FieldMapper::parse_date("2026-03-01 00:00:00"), expected);
        assert_eq!(FieldMapper::parse_date(""), None);
    }

    #[test]
    fn test_stock_accepts_integral_float() {
        let mut row = inventory_row();
        row.insert("stock".to_string(), "42.0".to_string());

        let record = FieldMapper.map_inventory_row(&row, 1).unwrap();

        assert_eq!(record.stock, 42);
    }

    #[test]
    fn test_invalid_stock_is_data_error() {
        let mut row = inventory_row();
        row.insert("stock".to_string(), "12.5".to_string());

        let err = FieldMapper.map_inventory_row(&row, 7).unwrap_err();

        match err {
            ImportError::DataError { row, field, value, .. } => {
                assert_eq!(row, 7);
                assert_eq!(field, "stock");
                assert_eq!(value, "12.5");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_negative_price_is_data_error() {
        let mut row = inventory_row();
        row.insert("unit_price".to_string(), "-1".to_string());

        let result = FieldMapper.map_inventory_row(&row, 1);

        assert!(matches!(result, Err(ImportError::DataError { field, .. }) if field == "unit_price"));
    }

    #[test]
    fn test_empty_store_id_is_data_error() {
        let mut row = inventory_row();
        row.insert("store_id".to_string(), "  ".to_string());

        let result = FieldMapper.map_inventory_row(&row, 1);

        assert!(matches!(result, Err(ImportError::DataError { field, .. }) if field == "store_id"));
    }

    #[test]
    fn test_map_route_row() {
        let mut row = RawRow::new();
        row.insert("from_store".to_string(), "S1".to_string());
        row.insert("to_store".to_string(), "S2".to_string());
        row.insert("distance_km".to_string(), "12".to_string());

        let route = FieldMapper.map_route_row(&row, 1).unwrap();

        assert_eq!(route.from_store, "S1");
        assert_eq!(route.to_store, "S2");
        assert_eq!(route.distance_km, 12.0);
    }

    #[test]
    fn test_map_route_row_invalid_distance() {
        let mut row = RawRow::new();
        row.insert("from_store".to_string(), "S1".to_string());
        row.insert("to_store".to_string(), "S2".to_string());
        row.insert("distance_km".to_string(), "far".to_string());

        let err = FieldMapper.map_route_row(&row, 2).unwrap_err();

        assert!(matches!(err, ImportError::DataError { table: TableKind::Distance, row: 2, .. }));
    }
}
