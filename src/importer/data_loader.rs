// ==========================================
// 智能库存调拨系统 - 数据加载器实现
// ==========================================
// 职责: 整合加载流程，从两张输入表到领域对象
// 流程: 解析 → 别名归一 → 结构校验 → 字段映射
// 红线: 任一表结构/数据错误 → 整体失败，不返回部分结果
// ==========================================

use crate::domain::batch::RawBatchRecord;
use crate::domain::transfer::RouteTable;
use crate::domain::types::TableKind;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{FieldMapper as FieldMapperTrait, FileParser, ParsedTable};
use crate::importer::schema_validator::SchemaValidator;
use std::path::Path;
use tracing::{debug, info, instrument};

// ==========================================
// LoadedInputs - 加载结果
// ==========================================
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub records: Vec<RawBatchRecord>,
    pub routes: RouteTable,
}

// ==========================================
// DataLoader - 数据加载器
// ==========================================
pub struct DataLoader {
    file_parser: Box<dyn FileParser>,
    field_mapper: Box<dyn FieldMapperTrait>,
    schema_validator: SchemaValidator,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(Box::new(UniversalFileParser), Box::new(FieldMapper))
    }
}

impl DataLoader {
    pub fn new(file_parser: Box<dyn FileParser>, field_mapper: Box<dyn FieldMapperTrait>) -> Self {
        Self {
            file_parser,
            field_mapper,
            schema_validator: SchemaValidator,
        }
    }

    /// 从文件加载库存表与距离表
    #[instrument(skip(self, inventory_path, distance_path))]
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        inventory_path: P,
        distance_path: Q,
    ) -> ImportResult<LoadedInputs> {
        info!(
            inventory = %inventory_path.as_ref().display(),
            distance = %distance_path.as_ref().display(),
            "开始加载输入表"
        );

        let inventory = self.file_parser.parse_table(inventory_path.as_ref())?;
        let distance = self.file_parser.parse_table(distance_path.as_ref())?;

        self.load_tables(inventory, distance)
    }

    /// 从已解析的表格加载（上传内容、测试数据）
    pub fn load_tables(
        &self,
        mut inventory: ParsedTable,
        mut distance: ParsedTable,
    ) -> ImportResult<LoadedInputs> {
        // 两张表都先做结构校验，再做数据映射
        self.schema_validator
            .normalize_and_check(TableKind::Inventory, &mut inventory)?;
        self.schema_validator
            .normalize_and_check(TableKind::Distance, &mut distance)?;

        let records = inventory
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| self.field_mapper.map_inventory_row(row, idx + 1))
            .collect::<ImportResult<Vec<_>>>()?;

        let mut routes = RouteTable::new();
        for (idx, row) in distance.rows.iter().enumerate() {
            let route = self.field_mapper.map_route_row(row, idx + 1)?;
            if !routes.insert(route) {
                debug!(row_number = idx + 1, "重复路线，保留首条");
            }
        }

        info!(
            batches = records.len(),
            routes = routes.len(),
            "输入表加载完成"
        );

        Ok(LoadedInputs { records, routes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::ImportError;
    use crate::importer::file_parser::CsvParser;

    fn csv(text: &str) -> ParsedTable {
        CsvParser.parse_reader(text.as_bytes()).unwrap()
    }

    const INVENTORY: &str = "store_id,product_id,stock,expiry_date,shelf_life_days,avg_daily_sales,price,product_name\n\
        S1,P1,100,2026-03-01,10,5,10,Milk\n\
        S2,P1,5,2026-03-01,10,5,10,Milk\n";

    const DISTANCE: &str = "from_store,to_store,distance_km\nS1,S2,12\nS1,S2,40\n";

    #[test]
    fn test_load_tables_happy_path() {
        let loaded = DataLoader::default()
            .load_tables(csv(INVENTORY), csv(DISTANCE))
            .unwrap();

        assert_eq!(loaded.records.len(), 2);
        assert_eq!(loaded.records[0].unit_price, 10.0);
        assert_eq!(loaded.records[1].row_number, 2);
        assert_eq!(loaded.routes.len(), 1);
        assert_eq!(loaded.routes.distance("S1", "S2"), Some(12.0));
    }

    #[test]
    fn test_distance_schema_error_aborts_load() {
        let result = DataLoader::default().load_tables(csv(INVENTORY), csv("from_store,to_store\n"));

        assert!(matches!(
            result,
            Err(ImportError::SchemaError { table: TableKind::Distance, .. })
        ));
    }

    #[test]
    fn test_data_error_aborts_load() {
        let inventory = "store_id,product_id,stock,expiry_date,shelf_life_days,avg_daily_sales,unit_price\n\
            S1,P1,100,2026-03-01,10,5,10\n\
            S2,P1,oops,2026-03-01,10,5,10\n";

        let result = DataLoader::default().load_tables(csv(inventory), csv(DISTANCE));

        assert!(matches!(
            result,
            Err(ImportError::DataError { row: 2, .. })
        ));
    }
}
