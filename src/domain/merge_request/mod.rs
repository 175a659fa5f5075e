//! Merge Request Context - 合并请求限界上下文
//!
//! 职责:
//! - 合并请求聚合及其单向状态机
//! - 提交资格判定

mod aggregate;
mod eligibility;
mod errors;
mod value_objects;

pub use aggregate::MergeRequest;
pub use eligibility::{SubmitBlocker, SubmitEligibility};
pub use errors::MergeRequestError;
pub use value_objects::{MergeRequestId, MergeStatus};
