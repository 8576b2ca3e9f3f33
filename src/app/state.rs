// ==========================================
// 智能库存调拨系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接和API实例
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::api::RunApi;
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_sqlite_connection};
use crate::repository::RunOutputRepositoryImpl;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SMARTSTOCK_DB_PATH";

/// 应用状态
pub struct AppState {
    pub db_path: String,
    pub config_manager: Arc<ConfigManager>,
    pub run_output_repo: Arc<RunOutputRepositoryImpl>,
    pub run_api: Arc<RunApi<ConfigManager, RunOutputRepositoryImpl>>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        // 共享连接（配置与运行结果同库）
        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        ensure_schema(&conn).map_err(|e| format!("无法初始化数据库结构: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let run_output_repo = Arc::new(
            RunOutputRepositoryImpl::from_connection(conn)
                .map_err(|e| format!("无法创建RunOutputRepository: {}", e))?,
        );

        let run_api = Arc::new(RunApi::new(config_manager.clone(), run_output_repo.clone()));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            config_manager,
            run_output_repo,
            run_api,
        })
    }
}

/// 默认数据库路径
///
/// 优先级: 环境变量 SMARTSTOCK_DB_PATH → 用户数据目录 → 当前目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./smartstock.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("smartstock");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("smartstock.db");
        }
    }

    path.to_string_lossy().to_string()
}
