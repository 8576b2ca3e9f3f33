// ==========================================
// 智能库存调拨系统 - 命令行入口
// ==========================================
// 用法: smartstock <inventory> <distances> [db_path]
// 输出: stdout 打印 RunResponse JSON；日志写 stderr
// ==========================================

use anyhow::{bail, Context, Result};
use smartstock::app::{get_default_db_path, AppState};
use smartstock::logging;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 3 {
        bail!("用法: smartstock <inventory> <distances> [db_path]");
    }

    let inventory = PathBuf::from(&args[0]);
    let distances = PathBuf::from(&args[1]);
    let db_path = args.get(2).cloned().unwrap_or_else(get_default_db_path);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", smartstock::APP_NAME, smartstock::VERSION);
    tracing::info!("使用数据库: {}", db_path);
    tracing::info!("==================================================");

    let state = AppState::new(db_path).map_err(anyhow::Error::msg)?;

    let response = state
        .run_api
        .run_files(&inventory, &distances, None)
        .await
        .with_context(|| format!("运行失败: {}", inventory.display()))?;

    println!(
        "{}",
        serde_json::to_string_pretty(&response).context("结果序列化失败")?
    );

    Ok(())
}
