//! Chapter Context - Value Objects

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ChapterError;

/// 章节唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChapterId(Uuid);

impl ChapterId {
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

impl Default for ChapterId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ChapterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 章节序号（正整数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChapterNumber(i64);

impl ChapterNumber {
    pub fn new(number: i64) -> Result<Self, &'static str> {
        if number < 1 {
            return Err("章节序号必须为正整数");
        }
        Ok(Self(number))
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// 章节正文
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterContent(String);

impl ChapterContent {
    pub fn new(content: impl Into<String>) -> Result<Self, &'static str> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err("章节内容不能为空");
        }
        Ok(Self(content))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 分支类型标签（存储与接口使用）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchType {
    /// 主线章节
    Main,
    /// 分支章节
    Fork,
    /// 已合并分支
    Merged,
}

impl BranchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchType::Main => "main",
            BranchType::Fork => "fork",
            BranchType::Merged => "merged",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "main" => Some(BranchType::Main),
            "fork" => Some(BranchType::Fork),
            "merged" => Some(BranchType::Merged),
            _ => None,
        }
    }
}

impl std::fmt::Display for BranchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 章节谱系
///
/// 主线章节没有父章节；分支与已合并分支必定有父章节。
/// 用带标签的枚举表达，使 "main 有父章节" 之类的状态无法构造。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "branch_type", rename_all = "lowercase")]
pub enum Lineage {
    Main,
    Fork { parent: ChapterId },
    Merged { parent: ChapterId },
}

impl Lineage {
    /// 由存储的 (branch_type, parent_chapter_id) 组合还原
    pub fn from_parts(
        branch_type: BranchType,
        parent: Option<ChapterId>,
    ) -> Result<Self, ChapterError> {
        match (branch_type, parent) {
            (BranchType::Main, None) => Ok(Lineage::Main),
            (BranchType::Fork, Some(parent)) => Ok(Lineage::Fork { parent }),
            (BranchType::Merged, Some(parent)) => Ok(Lineage::Merged { parent }),
            (BranchType::Main, Some(parent)) => Err(ChapterError::InconsistentLineage(format!(
                "主线章节不能有父章节 ({})",
                parent
            ))),
            (branch_type, None) => Err(ChapterError::InconsistentLineage(format!(
                "{} 章节必须有父章节",
                branch_type
            ))),
        }
    }

    pub fn branch_type(&self) -> BranchType {
        match self {
            Lineage::Main => BranchType::Main,
            Lineage::Fork { .. } => BranchType::Fork,
            Lineage::Merged { .. } => BranchType::Merged,
        }
    }

    pub fn parent(&self) -> Option<ChapterId> {
        match self {
            Lineage::Main => None,
            Lineage::Fork { parent } | Lineage::Merged { parent } => Some(*parent),
        }
    }
}
