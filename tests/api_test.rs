//! HTTP API integration tests
//!
//! 使用内存 SQLite 构建完整 Router，通过 oneshot 发送请求

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderName, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use novelfork::infrastructure::events::EventPublisher;
use novelfork::infrastructure::http::{build_router, AppState, DEFAULT_USER_HEADER};
use novelfork::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteChapterRepository,
    SqliteMergeRequestRepository, SqliteNovelRepository, SqliteUserRepository,
};

// ============================================================================
// Helpers
// ============================================================================

async fn build_test_app() -> Router {
    let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
    run_migrations(&pool).await.unwrap();

    let state = AppState::new(
        Arc::new(SqliteUserRepository::new(pool.clone())),
        Arc::new(SqliteNovelRepository::new(pool.clone())),
        Arc::new(SqliteChapterRepository::new(pool.clone())),
        Arc::new(SqliteMergeRequestRepository::new(pool)),
        Arc::new(EventPublisher::new()),
        HeaderName::from_static(DEFAULT_USER_HEADER),
    );

    build_router(Arc::new(state))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(DEFAULT_USER_HEADER, user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();

    (status, json)
}

async fn get(app: &Router, uri: &str, user: Option<&str>) -> Value {
    let (status, json) = send(app, "GET", uri, user, None).await;
    assert_eq!(status, StatusCode::OK);
    json
}

async fn post(app: &Router, uri: &str, user: &str, body: Value) -> Value {
    let (status, json) = send(app, "POST", uri, Some(user), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    json
}

fn data_id(json: &Value) -> String {
    assert_eq!(json["errno"], 0, "unexpected error: {}", json);
    json["data"]["id"].as_str().unwrap().to_string()
}

async fn register(app: &Router, username: &str) -> String {
    let (_, json) = send(
        app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "username": username, "email": format!("{}@example.com", username) })),
    )
    .await;
    data_id(&json)
}

/// 作者、分支作者、小说、主线第一章
struct Fixture {
    app: Router,
    owner: String,
    forker: String,
    novel_id: String,
    main_id: String,
}

async fn fixture() -> Fixture {
    let app = build_test_app().await;
    let owner = register(&app, "owner").await;
    let forker = register(&app, "forker").await;

    let novel = post(
        &app,
        "/api/novels",
        &owner,
        json!({ "title": "星海", "description": "长篇" }),
    )
    .await;
    let novel_id = data_id(&novel);

    let main = post(
        &app,
        &format!("/api/novels/{}/chapters", novel_id),
        &owner,
        json!({ "title": "第一章", "content": "开端", "chapter_number": 1 }),
    )
    .await;
    let main_id = data_id(&main);

    Fixture {
        app,
        owner,
        forker,
        novel_id,
        main_id,
    }
}

async fn fork(f: &Fixture, user: &str, title: &str) -> String {
    let json = post(
        &f.app,
        &format!("/api/chapters/{}/fork", f.main_id),
        user,
        json!({ "title": title, "content": "另一种走向" }),
    )
    .await;
    data_id(&json)
}

async fn submit(f: &Fixture, user: &str, chapter_id: &str) -> Value {
    post(
        &f.app,
        &format!("/api/novels/{}/merge-requests", f.novel_id),
        user,
        json!({ "from_chapter_id": chapter_id, "review_comment": "请审阅" }),
    )
    .await
}

// ============================================================================
// Users / identity
// ============================================================================

#[tokio::test]
async fn test_ping() {
    let app = build_test_app().await;
    let json = get(&app, "/api/ping", None).await;
    assert_eq!(json["errno"], 0);
    assert_eq!(json["data"]["status"], "ok");
}

#[tokio::test]
async fn test_register_and_current_user() {
    let app = build_test_app().await;
    let id = register(&app, "alice").await;

    let me = get(&app, "/api/users/me", Some(&id)).await;
    assert_eq!(me["errno"], 0);
    assert_eq!(me["data"]["username"], "alice");
    assert_eq!(me["data"]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_register_duplicate_username_conflicts() {
    let app = build_test_app().await;
    register(&app, "alice").await;

    let (_, json) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "username": "alice", "email": "other@example.com" })),
    )
    .await;
    assert_eq!(json["errno"], 409);
}

#[tokio::test]
async fn test_register_invalid_username_rejected() {
    let app = build_test_app().await;
    let (_, json) = send(
        &app,
        "POST",
        "/api/users",
        None,
        Some(json!({ "username": "a b", "email": "ab@example.com" })),
    )
    .await;
    assert_eq!(json["errno"], 400);
}

#[tokio::test]
async fn test_missing_or_unknown_actor_is_unauthorized() {
    let app = build_test_app().await;

    let (status, json) = send(
        &app,
        "POST",
        "/api/novels",
        None,
        Some(json!({ "title": "无名" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["errno"], 401);

    let json = get(&app, "/api/users/me", Some("not-a-uuid")).await;
    assert_eq!(json["errno"], 401);

    let unknown = uuid::Uuid::new_v4().to_string();
    let json = get(&app, "/api/users/me", Some(&unknown)).await;
    assert_eq!(json["errno"], 401);
}

// ============================================================================
// Novels / chapters
// ============================================================================

#[tokio::test]
async fn test_novel_crud_is_owner_only() {
    let f = fixture().await;
    let uri = format!("/api/novels/{}", f.novel_id);

    let (_, json) = send(
        &f.app,
        "PUT",
        &uri,
        Some(&f.forker),
        Some(json!({ "title": "篡改" })),
    )
    .await;
    assert_eq!(json["errno"], 403);

    let (_, json) = send(
        &f.app,
        "PUT",
        &uri,
        Some(&f.owner),
        Some(json!({ "title": "星海 修订版" })),
    )
    .await;
    assert_eq!(json["errno"], 0);
    assert_eq!(json["data"]["title"], "星海 修订版");

    let list = get(&f.app, "/api/novels?skip=0&limit=10", None).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_only_owner_creates_main_chapters() {
    let f = fixture().await;
    let (_, json) = send(
        &f.app,
        "POST",
        &format!("/api/novels/{}/chapters", f.novel_id),
        Some(&f.forker),
        Some(json!({ "title": "第二章", "content": "越权", "chapter_number": 2 })),
    )
    .await;
    assert_eq!(json["errno"], 403);
}

#[tokio::test]
async fn test_create_main_chapter_rejects_invalid_input() {
    let f = fixture().await;
    let uri = format!("/api/novels/{}/chapters", f.novel_id);

    let invalid = [
        json!({ "title": "第二章", "content": "正文", "chapter_number": 0 }),
        json!({ "title": "第二章", "content": "正文", "chapter_number": -1 }),
        json!({ "title": "   ", "content": "正文", "chapter_number": 2 }),
        json!({ "title": "第二章", "content": "  ", "chapter_number": 2 }),
    ];
    for body in invalid {
        let json = post(&f.app, &uri, &f.owner, body.clone()).await;
        assert_eq!(json["errno"], 400, "body {} should be rejected", body);
    }

    // 输入校验先于作者校验
    let json = post(
        &f.app,
        &uri,
        &f.forker,
        json!({ "title": "第二章", "content": "正文", "chapter_number": 0 }),
    )
    .await;
    assert_eq!(json["errno"], 400);

    let chapters = get(&f.app, &uri, None).await;
    let chapters = chapters["data"].as_array().unwrap();
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0]["id"], f.main_id.as_str());
}

#[tokio::test]
async fn test_fork_rejects_blank_title_or_content() {
    let f = fixture().await;
    let uri = format!("/api/chapters/{}/fork", f.main_id);

    for body in [
        json!({ "title": " ", "content": "另一种走向" }),
        json!({ "title": "分支", "content": "" }),
    ] {
        let json = post(&f.app, &uri, &f.forker, body.clone()).await;
        assert_eq!(json["errno"], 400, "body {} should be rejected", body);
    }

    let forks = get(&f.app, &format!("/api/chapters/{}/forks", f.main_id), None).await;
    assert!(forks["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_fork_records_lineage() {
    let f = fixture().await;
    let fork_id = fork(&f, &f.forker, "第一章 另一种结局").await;

    let chapter = get(&f.app, &format!("/api/chapters/{}", fork_id), None).await;
    assert_eq!(chapter["data"]["branch_type"], "fork");
    assert_eq!(chapter["data"]["parent_chapter_id"], f.main_id.as_str());
    assert_eq!(chapter["data"]["novel_id"], f.novel_id.as_str());
    assert_eq!(chapter["data"]["chapter_number"], 1);
    assert_eq!(chapter["data"]["author_username"], "forker");
    assert_eq!(chapter["data"]["parent_chapter_title"], "第一章");

    let forks = get(&f.app, &format!("/api/chapters/{}/forks", f.main_id), None).await;
    assert_eq!(forks["data"].as_array().unwrap().len(), 1);

    let main = get(
        &f.app,
        &format!("/api/novels/{}/chapters/main", f.novel_id),
        None,
    )
    .await;
    assert_eq!(main["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_fork_of_missing_chapter_not_found() {
    let f = fixture().await;
    let missing = uuid::Uuid::new_v4();
    let (_, json) = send(
        &f.app,
        "POST",
        &format!("/api/chapters/{}/fork", missing),
        Some(&f.forker),
        Some(json!({ "title": "无源", "content": "..." })),
    )
    .await;
    assert_eq!(json["errno"], 404);
}

#[tokio::test]
async fn test_update_chapter_is_author_only() {
    let f = fixture().await;
    let fork_id = fork(&f, &f.forker, "分支").await;
    let uri = format!("/api/chapters/{}", fork_id);

    let (_, json) = send(
        &f.app,
        "PUT",
        &uri,
        Some(&f.owner),
        Some(json!({ "title": "改写", "content": "改写" })),
    )
    .await;
    assert_eq!(json["errno"], 403);

    let (_, json) = send(
        &f.app,
        "PUT",
        &uri,
        Some(&f.forker),
        Some(json!({ "title": "分支 v2", "content": "新正文" })),
    )
    .await;
    assert_eq!(json["errno"], 0);
    assert_eq!(json["data"]["content"], "新正文");
    assert_eq!(json["data"]["branch_type"], "fork");
}

#[tokio::test]
async fn test_delete_chapter_with_children_refused() {
    let f = fixture().await;
    let fork_id = fork(&f, &f.forker, "分支").await;

    let (_, json) = send(
        &f.app,
        "DELETE",
        &format!("/api/chapters/{}", f.main_id),
        Some(&f.owner),
        None,
    )
    .await;
    assert_eq!(json["errno"], 422);

    let (_, json) = send(
        &f.app,
        "DELETE",
        &format!("/api/chapters/{}", fork_id),
        Some(&f.forker),
        None,
    )
    .await;
    assert_eq!(json["errno"], 0);

    let json = get(&f.app, &format!("/api/chapters/{}", fork_id), None).await;
    assert_eq!(json["errno"], 404);
}

#[tokio::test]
async fn test_delete_novel_cascades() {
    let f = fixture().await;
    let fork_id = fork(&f, &f.forker, "分支").await;
    let mr_id = data_id(&submit(&f, &f.forker, &fork_id).await);

    let (_, json) = send(
        &f.app,
        "DELETE",
        &format!("/api/novels/{}", f.novel_id),
        Some(&f.forker),
        None,
    )
    .await;
    assert_eq!(json["errno"], 403);

    let (_, json) = send(
        &f.app,
        "DELETE",
        &format!("/api/novels/{}", f.novel_id),
        Some(&f.owner),
        None,
    )
    .await;
    assert_eq!(json["errno"], 0);

    for uri in [
        format!("/api/novels/{}", f.novel_id),
        format!("/api/chapters/{}", f.main_id),
        format!("/api/chapters/{}", fork_id),
        format!("/api/merge-requests/{}", mr_id),
    ] {
        let json = get(&f.app, &uri, None).await;
        assert_eq!(json["errno"], 404, "{} should be gone", uri);
    }
}

// ============================================================================
// Merge workflow
// ============================================================================

#[tokio::test]
async fn test_can_submit_reasons() {
    let f = fixture().await;
    let fork_id = fork(&f, &f.forker, "分支").await;

    let main = get(
        &f.app,
        &format!("/api/chapters/{}/can-submit", f.main_id),
        Some(&f.owner),
    )
    .await;
    assert_eq!(main["data"]["can_submit"], false);
    assert_eq!(main["data"]["reason"], "只有分支章节才能提交");

    let stranger = get(
        &f.app,
        &format!("/api/chapters/{}/can-submit", fork_id),
        Some(&f.owner),
    )
    .await;
    assert_eq!(stranger["data"]["can_submit"], false);
    assert_eq!(stranger["data"]["reason"], "只有分支作者才能提交分支");

    let author = get(
        &f.app,
        &format!("/api/chapters/{}/can-submit", fork_id),
        Some(&f.forker),
    )
    .await;
    assert_eq!(author["data"]["can_submit"], true);
    assert!(author["data"]["reason"].is_null());

    submit(&f, &f.forker, &fork_id).await;
    let pending = get(
        &f.app,
        &format!("/api/chapters/{}/can-submit", fork_id),
        Some(&f.forker),
    )
    .await;
    assert_eq!(pending["data"]["can_submit"], false);
    assert_eq!(pending["data"]["reason"], "该分支已经提交，等待审核中");
}

#[tokio::test]
async fn test_submit_rules() {
    let f = fixture().await;
    let fork_id = fork(&f, &f.forker, "分支").await;

    let json = submit(&f, &f.owner, &fork_id).await;
    assert_eq!(json["errno"], 403);

    let json = submit(&f, &f.owner, &f.main_id).await;
    assert_eq!(json["errno"], 409);

    let json = submit(&f, &f.forker, &fork_id).await;
    assert_eq!(json["errno"], 0);
    assert_eq!(json["data"]["status"], "pending");
    assert!(json["data"]["reviewed_at"].is_null());

    let duplicate = submit(&f, &f.forker, &fork_id).await;
    assert_eq!(duplicate["errno"], 409);

    let missing = submit(&f, &f.forker, &uuid::Uuid::new_v4().to_string()).await;
    assert_eq!(missing["errno"], 404);
}

#[tokio::test]
async fn test_submit_chapter_from_other_novel_rejected() {
    let f = fixture().await;
    let fork_id = fork(&f, &f.forker, "分支").await;

    let other = post(
        &f.app,
        "/api/novels",
        &f.forker,
        json!({ "title": "另一部" }),
    )
    .await;
    let other_id = data_id(&other);

    let json = post(
        &f.app,
        &format!("/api/novels/{}/merge-requests", other_id),
        &f.forker,
        json!({ "from_chapter_id": fork_id }),
    )
    .await;
    assert_eq!(json["errno"], 400);
}

#[tokio::test]
async fn test_approve_promotes_fork() {
    let f = fixture().await;
    let fork_id = fork(&f, &f.forker, "分支").await;
    let mr_id = data_id(&submit(&f, &f.forker, &fork_id).await);
    let approve_uri = format!("/api/merge-requests/{}/approve", mr_id);

    let json = post(&f.app, &approve_uri, &f.forker, json!({})).await;
    assert_eq!(json["errno"], 403);

    let json = post(&f.app, &approve_uri, &f.owner, json!({})).await;
    assert_eq!(json["errno"], 0);
    assert_eq!(json["data"]["status"], "approved");
    assert!(json["data"]["reviewed_at"].is_string());

    let chapter = get(&f.app, &format!("/api/chapters/{}", fork_id), None).await;
    assert_eq!(chapter["data"]["branch_type"], "merged");
    assert_eq!(chapter["data"]["parent_chapter_id"], f.main_id.as_str());

    let merged = get(
        &f.app,
        &format!("/api/chapters/{}/merged", f.main_id),
        None,
    )
    .await;
    assert_eq!(merged["data"].as_array().unwrap().len(), 1);

    let forks = get(&f.app, &format!("/api/chapters/{}/forks", f.main_id), None).await;
    assert!(forks["data"].as_array().unwrap().is_empty());

    let novel_merged = get(
        &f.app,
        &format!("/api/novels/{}/chapters/merged", f.novel_id),
        None,
    )
    .await;
    assert_eq!(novel_merged["data"][0]["id"], fork_id.as_str());

    let again = post(&f.app, &approve_uri, &f.owner, json!({})).await;
    assert_eq!(again["errno"], 422);

    let resubmit = submit(&f, &f.forker, &fork_id).await;
    assert_eq!(resubmit["errno"], 409);
}

#[tokio::test]
async fn test_reject_then_resubmit() {
    let f = fixture().await;
    let fork_id = fork(&f, &f.forker, "分支").await;
    let mr_id = data_id(&submit(&f, &f.forker, &fork_id).await);

    let json = post(
        &f.app,
        &format!("/api/merge-requests/{}/reject", mr_id),
        &f.owner,
        json!({ "review_comment": "节奏太快" }),
    )
    .await;
    assert_eq!(json["errno"], 0);
    assert_eq!(json["data"]["status"], "rejected");
    assert_eq!(json["data"]["review_comment"], "节奏太快");

    let chapter = get(&f.app, &format!("/api/chapters/{}", fork_id), None).await;
    assert_eq!(chapter["data"]["branch_type"], "fork");

    let approve = post(
        &f.app,
        &format!("/api/merge-requests/{}/approve", mr_id),
        &f.owner,
        json!({}),
    )
    .await;
    assert_eq!(approve["errno"], 422);

    let second = submit(&f, &f.forker, &fork_id).await;
    assert_eq!(second["errno"], 0);

    let list = get(
        &f.app,
        &format!("/api/novels/{}/merge-requests", f.novel_id),
        None,
    )
    .await;
    let list = list["data"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["status"], "pending");
    assert_eq!(list[1]["status"], "rejected");
    assert_eq!(list[0]["requester_username"], "forker");
}

#[tokio::test]
async fn test_reject_without_body() {
    let f = fixture().await;
    let fork_id = fork(&f, &f.forker, "分支").await;
    let mr_id = data_id(&submit(&f, &f.forker, &fork_id).await);

    let (_, json) = send(
        &f.app,
        "POST",
        &format!("/api/merge-requests/{}/reject", mr_id),
        Some(&f.owner),
        None,
    )
    .await;
    assert_eq!(json["errno"], 0);
    assert_eq!(json["data"]["status"], "rejected");
    assert_eq!(json["data"]["review_comment"], "请审阅");
}

#[tokio::test]
async fn test_sibling_forks_are_independent() {
    let f = fixture().await;
    let a = fork(&f, &f.forker, "分支 A").await;
    let b = fork(&f, &f.forker, "分支 B").await;

    let mr_a = data_id(&submit(&f, &f.forker, &a).await);
    let mr_b = data_id(&submit(&f, &f.forker, &b).await);

    post(
        &f.app,
        &format!("/api/merge-requests/{}/approve", mr_a),
        &f.owner,
        json!({}),
    )
    .await;

    let pending = get(&f.app, &format!("/api/merge-requests/{}", mr_b), None).await;
    assert_eq!(pending["data"]["status"], "pending");

    let sibling = get(&f.app, &format!("/api/chapters/{}", b), None).await;
    assert_eq!(sibling["data"]["branch_type"], "fork");
}

#[tokio::test]
async fn test_concurrent_submissions_admit_one() {
    let f = fixture().await;
    let fork_id = fork(&f, &f.forker, "分支").await;

    let (first, second) = tokio::join!(
        submit(&f, &f.forker, &fork_id),
        submit(&f, &f.forker, &fork_id)
    );

    let mut errnos = vec![first["errno"].as_i64(), second["errno"].as_i64()];
    errnos.sort();
    assert_eq!(errnos, vec![Some(0), Some(409)]);

    let list = get(
        &f.app,
        &format!("/api/novels/{}/merge-requests", f.novel_id),
        None,
    )
    .await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = build_test_app().await;
    let request = Request::builder()
        .uri("/api/nonexistent")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
