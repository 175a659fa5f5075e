//! Merge Request Context - Errors

use thiserror::Error;

use super::MergeStatus;

#[derive(Debug, Error)]
pub enum MergeRequestError {
    #[error("合并请求状态不允许从 {from} 变为 {to}")]
    InvalidTransition { from: MergeStatus, to: MergeStatus },

    #[error("合并请求数据不一致: {0}")]
    Inconsistent(String),
}
