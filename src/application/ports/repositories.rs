//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（如 SQLite）

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::chapter::{BranchType, Chapter, ChapterId};
use crate::domain::merge_request::{MergeRequest, MergeRequestId};
use crate::domain::novel::{Novel, NovelId};
use crate::domain::user::{User, UserId};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 唯一约束冲突
    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    /// 原子操作的前置条件在提交时不成立（如状态已被并发修改）
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

// ============================================================================
// User Repository
// ============================================================================

/// User Repository Port
#[async_trait]
pub trait UserRepositoryPort: Send + Sync {
    /// 新增用户，用户名或邮箱重复时返回 `Duplicate`
    async fn insert(&self, user: &User) -> Result<(), RepositoryError>;

    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// 批量查找用户（用于读模型补全用户名）
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, RepositoryError>;
}

// ============================================================================
// Novel Repository
// ============================================================================

/// Novel Repository Port
#[async_trait]
pub trait NovelRepositoryPort: Send + Sync {
    /// 保存小说（新增或更新）
    async fn save(&self, novel: &Novel) -> Result<(), RepositoryError>;

    /// 根据 ID 查找小说
    async fn find_by_id(&self, id: NovelId) -> Result<Option<Novel>, RepositoryError>;

    /// 分页获取小说（按创建时间倒序）
    async fn find_page(&self, offset: usize, limit: usize) -> Result<Vec<Novel>, RepositoryError>;

    /// 删除小说及其章节、合并请求（单个事务）
    async fn delete(&self, id: NovelId) -> Result<(), RepositoryError>;
}

// ============================================================================
// Chapter Repository
// ============================================================================

/// Chapter Repository Port
#[async_trait]
pub trait ChapterRepositoryPort: Send + Sync {
    /// 保存章节
    ///
    /// 新章节整行插入；已有章节只更新标题、正文和更新时间，
    /// 谱系变化只能通过审核通过（`MergeRequestRepositoryPort::commit_review`）
    async fn save(&self, chapter: &Chapter) -> Result<(), RepositoryError>;

    /// 根据 ID 查找章节
    async fn find_by_id(&self, id: ChapterId) -> Result<Option<Chapter>, RepositoryError>;

    /// 批量查找章节（用于读模型补全父章节标题）
    async fn find_by_ids(&self, ids: &[ChapterId]) -> Result<Vec<Chapter>, RepositoryError>;

    /// 获取小说的章节，按章节序号升序
    ///
    /// `branch_type` 为 None 时返回全部章节
    async fn find_by_novel(
        &self,
        novel_id: NovelId,
        branch_type: Option<BranchType>,
    ) -> Result<Vec<Chapter>, RepositoryError>;

    /// 获取指定章节下某一类型的子章节
    async fn find_children(
        &self,
        parent_id: ChapterId,
        branch_type: BranchType,
    ) -> Result<Vec<Chapter>, RepositoryError>;

    /// 删除章节及引用它的合并请求（单个事务）
    ///
    /// 仍有子章节时返回 `PreconditionFailed`，什么都不删除
    async fn delete(&self, id: ChapterId) -> Result<(), RepositoryError>;
}

// ============================================================================
// Merge Request Repository
// ============================================================================

/// Merge Request Repository Port
#[async_trait]
pub trait MergeRequestRepositoryPort: Send + Sync {
    /// 原子地插入 pending 请求
    ///
    /// 插入与以下检查在同一原子操作内完成：
    /// - 来源章节仍是目标小说下的 fork，否则 `PreconditionFailed`
    /// - 该章节没有其他 pending 请求，否则 `Duplicate`
    async fn insert_pending(&self, request: &MergeRequest) -> Result<(), RepositoryError>;

    /// 根据 ID 查找合并请求
    async fn find_by_id(&self, id: MergeRequestId)
        -> Result<Option<MergeRequest>, RepositoryError>;

    /// 获取小说的所有合并请求（最新的在前）
    async fn find_by_novel(&self, novel_id: NovelId) -> Result<Vec<MergeRequest>, RepositoryError>;

    /// 章节是否有 pending 请求
    async fn has_pending(&self, chapter_id: ChapterId) -> Result<bool, RepositoryError>;

    /// 原子地提交审核结果
    ///
    /// `request` 必须已处于终态。数据库中的记录仍为 pending 时才会写入，
    /// approved 时在同一事务中把来源章节晋升为 merged；任一步失败则整体回滚。
    async fn commit_review(&self, request: &MergeRequest) -> Result<(), RepositoryError>;
}
