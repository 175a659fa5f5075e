//! Event Publisher Implementation
//!
//! WebSocket 事件推送实现

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::domain::chapter::Chapter;
use crate::domain::merge_request::{MergeRequest, MergeStatus};
use crate::domain::novel::NovelId;

/// 默认通道容量
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// WebSocket 事件类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum WsEvent {
    /// 新分支
    ChapterForked {
        novel_id: Uuid,
        chapter_id: Uuid,
        parent_chapter_id: Uuid,
        author_id: Uuid,
    },
    /// 合并请求已提交
    MergeRequestSubmitted {
        novel_id: Uuid,
        merge_request_id: Uuid,
        from_chapter_id: Uuid,
        requested_by: Uuid,
    },
    /// 合并请求已接纳，来源分支变为 merged
    MergeRequestApproved {
        novel_id: Uuid,
        merge_request_id: Uuid,
        from_chapter_id: Uuid,
    },
    /// 合并请求已拒绝
    MergeRequestRejected {
        novel_id: Uuid,
        merge_request_id: Uuid,
        from_chapter_id: Uuid,
        #[serde(skip_serializing_if = "Option::is_none")]
        review_comment: Option<String>,
    },
    /// Novel 删除完成
    NovelDeleted { novel_id: Uuid },
}

impl WsEvent {
    /// 事件所属小说
    pub fn novel_id(&self) -> Uuid {
        match self {
            WsEvent::ChapterForked { novel_id, .. }
            | WsEvent::MergeRequestSubmitted { novel_id, .. }
            | WsEvent::MergeRequestApproved { novel_id, .. }
            | WsEvent::MergeRequestRejected { novel_id, .. }
            | WsEvent::NovelDeleted { novel_id } => *novel_id,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            WsEvent::ChapterForked { .. } => "ChapterForked",
            WsEvent::MergeRequestSubmitted { .. } => "MergeRequestSubmitted",
            WsEvent::MergeRequestApproved { .. } => "MergeRequestApproved",
            WsEvent::MergeRequestRejected { .. } => "MergeRequestRejected",
            WsEvent::NovelDeleted { .. } => "NovelDeleted",
        }
    }
}

/// 事件发布器
pub struct EventPublisher {
    /// novel_id -> broadcast sender (for novel-specific events)
    novel_channels: DashMap<Uuid, broadcast::Sender<WsEvent>>,
    /// Global broadcast channel
    global_channel: broadcast::Sender<WsEvent>,
    capacity: usize,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (global_tx, _) = broadcast::channel(capacity);
        Self {
            novel_channels: DashMap::new(),
            global_channel: global_tx,
            capacity,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅全局事件
    pub fn subscribe_global(&self) -> broadcast::Receiver<WsEvent> {
        self.global_channel.subscribe()
    }

    /// 订阅单本小说的事件，通道不存在时创建
    pub fn subscribe_novel(&self, novel_id: Uuid) -> broadcast::Receiver<WsEvent> {
        self.novel_channels
            .entry(novel_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// 最后一个订阅者离开后回收小说通道
    pub fn release_novel(&self, novel_id: Uuid) {
        let released = self
            .novel_channels
            .remove_if(&novel_id, |_, sender| sender.receiver_count() == 0)
            .is_some();
        tracing::debug!(
            novel_id = %novel_id,
            released,
            active = self.novel_channel_count(),
            "Novel channel release requested"
        );
    }

    /// 当前存在的小说通道数量
    pub fn novel_channel_count(&self) -> usize {
        self.novel_channels.len()
    }

    /// 发布分支事件
    pub fn publish_chapter_forked(&self, chapter: &Chapter) {
        let Some(parent) = chapter.parent_chapter_id() else {
            return;
        };
        self.publish(WsEvent::ChapterForked {
            novel_id: *chapter.novel_id().as_uuid(),
            chapter_id: *chapter.id().as_uuid(),
            parent_chapter_id: *parent.as_uuid(),
            author_id: *chapter.author_id().as_uuid(),
        });
    }

    /// 发布合并请求提交事件
    pub fn publish_merge_request_submitted(&self, request: &MergeRequest) {
        self.publish(WsEvent::MergeRequestSubmitted {
            novel_id: *request.to_novel_id().as_uuid(),
            merge_request_id: *request.id().as_uuid(),
            from_chapter_id: *request.from_chapter_id().as_uuid(),
            requested_by: *request.requested_by().as_uuid(),
        });
    }

    /// 发布审核结果事件，pending 状态的请求不发布
    pub fn publish_merge_request_reviewed(&self, request: &MergeRequest) {
        let novel_id = *request.to_novel_id().as_uuid();
        let merge_request_id = *request.id().as_uuid();
        let from_chapter_id = *request.from_chapter_id().as_uuid();

        let event = match request.status() {
            MergeStatus::Approved => WsEvent::MergeRequestApproved {
                novel_id,
                merge_request_id,
                from_chapter_id,
            },
            MergeStatus::Rejected => WsEvent::MergeRequestRejected {
                novel_id,
                merge_request_id,
                from_chapter_id,
                review_comment: request.review_comment().map(str::to_string),
            },
            MergeStatus::Pending => return,
        };
        self.publish(event);
    }

    /// 发布 Novel 删除完成事件，并关闭该小说的通道
    pub fn publish_novel_deleted(&self, novel_id: NovelId) {
        let novel_id = *novel_id.as_uuid();
        self.publish(WsEvent::NovelDeleted { novel_id });
        self.novel_channels.remove(&novel_id);
    }

    /// 同时发布到全局通道和小说通道
    fn publish(&self, event: WsEvent) {
        let novel_id = event.novel_id();
        let name = event.name();

        if let Some(sender) = self.novel_channels.get(&novel_id) {
            if let Err(e) = sender.send(event.clone()) {
                tracing::debug!(
                    novel_id = %novel_id,
                    event = name,
                    error = %e,
                    "Failed to publish novel event (no receivers)"
                );
            }
        }

        if let Err(e) = self.global_channel.send(event) {
            tracing::debug!(
                novel_id = %novel_id,
                event = name,
                error = %e,
                "Failed to publish global event (no receivers)"
            );
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
