//! Post Commands

use serde::Deserialize;

use crate::application::ports::PostChanges;

/// 创建文章命令
///
/// `author_id` 保持原始字符串，由服务层解析
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
    pub author_id: String,
}

/// 更新文章命令，作者不可修改
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePost {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
}

impl From<UpdatePost> for PostChanges {
    fn from(command: UpdatePost) -> Self {
        Self {
            title: command.title,
            content: command.content,
            published: command.published,
        }
    }
}
