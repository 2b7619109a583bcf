//! 应用层 - 命令（写操作输入）

mod post_commands;
mod user_commands;

pub use post_commands::*;
pub use user_commands::*;
