//! Merge Request Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::MergeRequestError;

/// 合并请求唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MergeRequestId(Uuid);

impl MergeRequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for MergeRequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MergeRequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 合并请求状态
///
/// ```text
/// pending ──approve──> approved (终态)
///    └─────reject────> rejected (终态)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStatus {
    /// 等待审核
    Pending,
    /// 已接纳
    Approved,
    /// 已拒绝
    Rejected,
}

impl MergeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStatus::Pending => "pending",
            MergeStatus::Approved => "approved",
            MergeStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(MergeStatus::Pending),
            "approved" => Some(MergeStatus::Approved),
            "rejected" => Some(MergeStatus::Rejected),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, MergeStatus::Pending)
    }

    /// 状态迁移守卫：只允许 pending -> approved / rejected
    pub fn transition_to(self, target: MergeStatus) -> Result<MergeStatus, MergeRequestError> {
        match (self, target) {
            (MergeStatus::Pending, MergeStatus::Approved)
            | (MergeStatus::Pending, MergeStatus::Rejected) => Ok(target),
            (from, to) => Err(MergeRequestError::InvalidTransition { from, to }),
        }
    }
}

impl std::fmt::Display for MergeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_forward_edges_allowed() {
        use MergeStatus::*;

        assert_eq!(Pending.transition_to(Approved).unwrap(), Approved);
        assert_eq!(Pending.transition_to(Rejected).unwrap(), Rejected);

        for from in [Approved, Rejected] {
            for to in [Pending, Approved, Rejected] {
                assert!(from.transition_to(to).is_err(), "{from} -> {to}");
            }
        }
        assert!(Pending.transition_to(Pending).is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(!MergeStatus::Pending.is_terminal());
        assert!(MergeStatus::Approved.is_terminal());
        assert!(MergeStatus::Rejected.is_terminal());
    }
}
