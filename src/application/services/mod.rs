//! 应用层 - 实体服务
//!
//! 业务规则（唯一性、引用存在性）在这里检查，然后交给仓储持久化。
//! 所有写操作都是“先查后写”两步，中间没有事务。

mod post_service;
mod user_service;

pub use post_service::{AuthorView, PostService, PostView};
pub use user_service::{UserDetail, UserPostSummary, UserService, UserView};

use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// 非法 UUID 不可能对应任何实体
fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// 与存储精度（微秒）一致的当前时间
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
