//! User Commands

use serde::Deserialize;

use crate::application::ports::{Role, UserChanges};

/// 创建用户命令
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub password: String,
    #[serde(default)]
    pub role: Option<Role>,
}

/// 更新用户命令，未给出的字段保持不变
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl From<UpdateUser> for UserChanges {
    fn from(command: UpdateUser) -> Self {
        Self {
            email: command.email,
            name: command.name,
            password: command.password,
            role: command.role,
        }
    }
}
