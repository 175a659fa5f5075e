//! WebSocket Handlers

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::application::GetNovel;
use crate::domain::novel::NovelId;
use crate::infrastructure::events::WsEvent;
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 全局 WebSocket 连接处理（所有小说的事件）
pub async fn global_websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let event_rx = state.event_publisher.subscribe_global();
    ws.on_upgrade(move |socket| async move {
        tracing::info!("Global WebSocket connected");
        pump_events(socket, event_rx).await;
        tracing::info!("Global WebSocket disconnected");
    })
}

/// 单本小说的 WebSocket 连接处理
pub async fn novel_websocket_handler(
    ws: WebSocketUpgrade,
    Path(novel_id): Path<Uuid>,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    // 验证小说存在
    state
        .get_novel_handler
        .handle(GetNovel {
            novel_id: NovelId::from_uuid(novel_id),
        })
        .await?;

    let event_rx = state.event_publisher.subscribe_novel(novel_id);

    Ok(ws.on_upgrade(move |socket| async move {
        tracing::info!(novel_id = %novel_id, "Novel WebSocket connected");
        pump_events(socket, event_rx).await;

        // 清理
        state.event_publisher.release_novel(novel_id);
        tracing::info!(novel_id = %novel_id, "Novel WebSocket disconnected");
    }))
}

/// 把订阅到的事件转发给客户端，直到任一方向断开
async fn pump_events(socket: WebSocket, mut event_rx: broadcast::Receiver<WsEvent>) {
    let (mut sender, mut receiver) = socket.split();

    // 事件转发任务
    let mut forward_task = tokio::spawn(async move {
        loop {
            let event = match event_rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "WebSocket subscriber lagged, events dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            let msg = match serde_json::to_string(&event) {
                Ok(json) => Message::Text(json),
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize event");
                    continue;
                }
            };

            if let Err(e) = sender.send(msg).await {
                tracing::debug!(error = %e, "Failed to send WebSocket message");
                break;
            }
        }
    });

    // 接收客户端消息（心跳）
    let mut receive_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => {
                    tracing::debug!("WebSocket closed by client");
                    break;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "WebSocket error");
                    break;
                }
                // Ping 由 axum 自动回复 Pong
                _ => {}
            }
        }
    });

    // 等待任一任务完成，另一个任务结束后才返回，
    // 此时订阅者已被释放，调用方可以回收小说通道
    tokio::select! {
        _ = &mut forward_task => stop_task(receive_task).await,
        _ = &mut receive_task => stop_task(forward_task).await,
    }
}

/// 取消任务并等待其退出，任务持有的资源（如 broadcast::Receiver）随之释放
async fn stop_task(task: JoinHandle<()>) {
    task.abort();
    if let Err(e) = task.await {
        if !e.is_cancelled() {
            tracing::warn!(error = %e, "WebSocket task failed");
        }
    }
}
