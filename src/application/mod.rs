//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（各聚合的 Repository）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // User commands
    RegisterUser,
    // Novel commands
    CreateNovel,
    DeleteNovel,
    UpdateNovel,
    // Chapter commands
    CreateMainChapter,
    DeleteChapter,
    ForkChapter,
    UpdateChapter,
    // Merge request commands
    ApproveMergeRequest,
    RejectMergeRequest,
    SubmitMergeRequest,
    // Handlers
    handlers::{
        ApproveMergeRequestHandler, CreateMainChapterHandler, CreateNovelHandler,
        DeleteChapterHandler, DeleteNovelHandler, ForkChapterHandler, RegisterUserHandler,
        RejectMergeRequestHandler, SubmitMergeRequestHandler, UpdateChapterHandler,
        UpdateNovelHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    ChapterRepositoryPort, MergeRequestRepositoryPort, NovelRepositoryPort, RepositoryError,
    UserRepositoryPort,
};

pub use queries::{
    // User queries
    GetUser,
    // Novel queries
    GetNovel,
    ListNovels,
    // Chapter queries
    GetChapter,
    ListForks,
    ListMergedChildren,
    ListNovelChapters,
    // Merge request queries
    CheckSubmission,
    GetMergeRequest,
    ListMergeRequests,
    // Handlers & views
    handlers::{
        ChapterView, CheckSubmissionHandler, GetChapterHandler, GetMergeRequestHandler,
        GetNovelHandler, GetUserHandler, ListForksHandler, ListMergeRequestsHandler,
        ListMergedChildrenHandler, ListNovelChaptersHandler, ListNovelsHandler, MergeRequestView,
        NovelView, SubmissionView, UserView,
    },
};
