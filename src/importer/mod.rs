// ==========================================
// 智能库存调拨系统 - 导入层
// ==========================================
// 职责: 外部输入表加载，生成领域对象
// 支持: Excel, CSV
// ==========================================

pub mod data_loader;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;
pub mod schema_validator;

// 重导出核心类型
pub use data_loader::{DataLoader, LoadedInputs};
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper as FieldMapperImpl;
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use importer_trait::{FieldMapper, FileParser, ParsedTable, RawRow};
pub use schema_validator::{SchemaValidator, DISTANCE_REQUIRED_COLUMNS, INVENTORY_REQUIRED_COLUMNS};
