//! Novel Commands

use crate::domain::novel::NovelId;
use crate::domain::user::UserId;

/// 创建小说命令
#[derive(Debug, Clone)]
pub struct CreateNovel {
    pub author: UserId,
    pub title: String,
    pub description: Option<String>,
}

/// 更新小说命令（仅作者）
#[derive(Debug, Clone)]
pub struct UpdateNovel {
    pub novel_id: NovelId,
    pub actor: UserId,
    pub title: String,
    pub description: Option<String>,
}

/// 删除小说命令（仅作者）
#[derive(Debug, Clone)]
pub struct DeleteNovel {
    pub novel_id: NovelId,
    pub actor: UserId,
}
