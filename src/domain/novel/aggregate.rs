//! Novel Context - Aggregate Root

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Description, NovelError, NovelId, Title};
use crate::domain::user::UserId;

/// Novel 聚合根
///
/// 不变量:
/// - 作者（author_id）创建后不可变更
/// - 只有作者可以修改、删除小说，以及裁决合并请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Novel {
    id: NovelId,
    title: Title,
    description: Option<Description>,
    author_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Novel {
    /// 创建新小说
    pub fn new(title: Title, description: Option<Description>, author_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: NovelId::new(),
            title,
            description,
            author_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// 从持久化数据重建
    pub fn restore(
        id: NovelId,
        title: Title,
        description: Option<Description>,
        author_id: UserId,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            author_id,
            created_at,
            updated_at,
        }
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.author_id == *user_id
    }

    /// 校验操作者是否为作者
    pub fn ensure_owner(&self, user_id: &UserId) -> Result<(), NovelError> {
        if self.is_owned_by(user_id) {
            Ok(())
        } else {
            Err(NovelError::NotOwner {
                novel_id: self.id,
                user_id: *user_id,
            })
        }
    }

    /// 更新标题和简介
    pub fn update(&mut self, title: Title, description: Option<Description>) {
        self.title = title;
        self.description = description;
        self.updated_at = Utc::now();
    }

    // Getters
    pub fn id(&self) -> &NovelId {
        &self.id
    }

    pub fn title(&self) -> &Title {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_ref().map(Description::as_str)
    }

    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_novel_creation() {
        let author = UserId::new();
        let novel = Novel::new(Title::new("测试小说").unwrap(), None, author);

        assert_eq!(novel.title().as_str(), "测试小说");
        assert!(novel.description().is_none());
        assert!(novel.is_owned_by(&author));
    }

    #[test]
    fn test_ensure_owner_rejects_other_user() {
        let novel = Novel::new(Title::new("测试小说").unwrap(), None, UserId::new());
        let stranger = UserId::new();

        assert!(matches!(
            novel.ensure_owner(&stranger),
            Err(NovelError::NotOwner { .. })
        ));
    }

    #[test]
    fn test_update_touches_timestamp() {
        let mut novel = Novel::new(Title::new("旧标题").unwrap(), None, UserId::new());
        let before = novel.updated_at();

        novel.update(
            Title::new("新标题").unwrap(),
            Description::parse(Some("简介".to_string())),
        );

        assert_eq!(novel.title().as_str(), "新标题");
        assert_eq!(novel.description(), Some("简介"));
        assert!(novel.updated_at() >= before);
    }
}
