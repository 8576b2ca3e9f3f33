// ==========================================
// 智能库存调拨系统 - 运行上下文
// ==========================================
// 一次运行只取一次时间戳，所有行共用同一个"今天"
// 引擎内部不读取系统时钟
// ==========================================

use chrono::{DateTime, Local, NaiveDate};

/// run_id 时间格式（毫秒后缀区分连续运行）
pub const RUN_ID_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    pub run_at: DateTime<Local>,
    pub run_date: NaiveDate,
    pub run_id: String,
}

impl RunContext {
    pub fn new(run_at: DateTime<Local>) -> Self {
        Self {
            run_date: run_at.date_naive(),
            run_id: run_at.format(RUN_ID_FORMAT).to_string(),
            run_at,
        }
    }

    /// 以当前时刻创建（仅在 API / 二进制入口调用）
    pub fn now() -> Self {
        Self::new(Local::now())
    }
}
