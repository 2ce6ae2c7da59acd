/// Notification dispatch flows against a live database
///
/// Verifies that state transitions create in-app notification rows for the
/// right recipients, that missing preference rows never break dispatch, and
/// that the notifications resource is scoped to its owner. Skips cleanly
/// without `DATABASE_URL`.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, request, TestContext};
use serde_json::json;
use sitedesk_shared::models::notification::{Notification, NotificationKind};
use sitedesk_shared::models::user::GlobalRole;
use tower::Service as _;
use uuid::Uuid;

async fn create_project(ctx: &mut TestContext, token: &str, name: &str) -> Uuid {
    let response = ctx
        .app
        .call(request(
            Method::POST,
            "/api/projects",
            Some(token),
            Some(json!({ "name": name })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap()
}

async fn add_member(ctx: &mut TestContext, token: &str, project_id: Uuid, user_id: Uuid, role: &str) {
    let response = ctx
        .app
        .call(request(
            Method::POST,
            "/api/project-members",
            Some(token),
            Some(json!({ "project_id": project_id, "user_id": user_id, "role": role })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_task_assignment_notifies_without_preference_row() {
    let Some(mut ctx) = TestContext::try_new().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let (_, owner_token) = ctx.create_user(GlobalRole::Member).await;
    let (assignee, _) = ctx.create_user(GlobalRole::Member).await;
    let project_id = create_project(&mut ctx, &owner_token, "Notify Me").await;
    add_member(&mut ctx, &owner_token, project_id, assignee.id, "member").await;

    // The assignee has never touched their notification preferences; the
    // request must still succeed and the row must still be written
    let response = ctx
        .app
        .call(request(
            Method::POST,
            "/api/tasks",
            Some(&owner_token),
            Some(json!({
                "project_id": project_id,
                "title": "Pour foundation",
                "assigned_to": assignee.id,
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let notifications = Notification::list_by_user(&ctx.db, assignee.id, false, 10)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::TaskAssigned);
    assert!(notifications[0].title.contains("Pour foundation"));
    assert_eq!(notifications[0].project_id, Some(project_id));

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_reassignment_renotifies_new_assignee() {
    let Some(mut ctx) = TestContext::try_new().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let (_, owner_token) = ctx.create_user(GlobalRole::Member).await;
    let (first, _) = ctx.create_user(GlobalRole::Member).await;
    let (second, _) = ctx.create_user(GlobalRole::Member).await;
    let project_id = create_project(&mut ctx, &owner_token, "Handover").await;
    add_member(&mut ctx, &owner_token, project_id, first.id, "member").await;
    add_member(&mut ctx, &owner_token, project_id, second.id, "member").await;

    let response = ctx
        .app
        .call(request(
            Method::POST,
            "/api/tasks",
            Some(&owner_token),
            Some(json!({
                "project_id": project_id,
                "title": "Order windows",
                "assigned_to": first.id,
            })),
        ))
        .await
        .unwrap();
    let task_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    // Reassigning notifies the new assignee
    let response = ctx
        .app
        .call(request(
            Method::PUT,
            &format!("/api/tasks?id={task_id}"),
            Some(&owner_token),
            Some(json!({ "assigned_to": second.id })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let notifications = Notification::list_by_user(&ctx.db, second.id, false, 10)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);

    // A no-op update (same assignee) does not notify again
    let response = ctx
        .app
        .call(request(
            Method::PUT,
            &format!("/api/tasks?id={task_id}"),
            Some(&owner_token),
            Some(json!({ "assigned_to": second.id, "status": "in_progress" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let notifications = Notification::list_by_user(&ctx.db, second.id, false, 10)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_document_upload_notifies_members_except_uploader() {
    let Some(mut ctx) = TestContext::try_new().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let (_, owner_token) = ctx.create_user(GlobalRole::Member).await;
    let (colleague, _) = ctx.create_user(GlobalRole::Member).await;
    let (uploader, uploader_token) = ctx.create_user(GlobalRole::Member).await;
    let project_id = create_project(&mut ctx, &owner_token, "Upload Fanout").await;
    add_member(&mut ctx, &owner_token, project_id, colleague.id, "member").await;
    add_member(&mut ctx, &owner_token, project_id, uploader.id, "member").await;

    let response = ctx
        .app
        .call(request(
            Method::POST,
            "/api/documents",
            Some(&uploader_token),
            Some(json!({
                "project_id": project_id,
                "name": "facade.pdf",
                "file_url": "https://files.sitedesk.io/facade-v1.pdf",
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let colleague_rows = Notification::list_by_user(&ctx.db, colleague.id, false, 10)
        .await
        .unwrap();
    assert_eq!(colleague_rows.len(), 1);
    assert_eq!(colleague_rows[0].kind, NotificationKind::DocumentUploaded);

    let uploader_rows = Notification::list_by_user(&ctx.db, uploader.id, false, 10)
        .await
        .unwrap();
    assert!(uploader_rows.is_empty());

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_mentions_filtered_to_project_members() {
    let Some(mut ctx) = TestContext::try_new().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let (_, owner_token) = ctx.create_user(GlobalRole::Member).await;
    let (member, _) = ctx.create_user(GlobalRole::Member).await;
    let (outsider, _) = ctx.create_user(GlobalRole::Member).await;
    let project_id = create_project(&mut ctx, &owner_token, "Mention Board").await;
    add_member(&mut ctx, &owner_token, project_id, member.id, "client").await;

    let response = ctx
        .app
        .call(request(
            Method::POST,
            "/api/messages",
            Some(&owner_token),
            Some(json!({
                "project_id": project_id,
                "body": "Please check the slab detail before Friday",
                "mentions": [member.id, outsider.id, Uuid::new_v4()],
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let member_rows = Notification::list_by_user(&ctx.db, member.id, false, 10)
        .await
        .unwrap();
    assert_eq!(member_rows.len(), 1);
    assert_eq!(member_rows[0].kind, NotificationKind::Mention);
    assert!(member_rows[0].body.as_deref().unwrap_or_default().contains("slab detail"));

    // Non-members are silently dropped, not an error
    let outsider_rows = Notification::list_by_user(&ctx.db, outsider.id, false, 10)
        .await
        .unwrap();
    assert!(outsider_rows.is_empty());

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_approval_status_change_notifies_members() {
    let Some(mut ctx) = TestContext::try_new().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let (_, owner_token) = ctx.create_user(GlobalRole::Member).await;
    let (member, _) = ctx.create_user(GlobalRole::Member).await;
    let project_id = create_project(&mut ctx, &owner_token, "Permit Watch").await;
    add_member(&mut ctx, &owner_token, project_id, member.id, "member").await;

    let response = ctx
        .app
        .call(request(
            Method::POST,
            "/api/city-approvals",
            Some(&owner_token),
            Some(json!({ "project_id": project_id, "approval_type": "building permit" })),
        ))
        .await
        .unwrap();
    let approval_id = body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = ctx
        .app
        .call(request(
            Method::PUT,
            &format!("/api/city-approvals?id={approval_id}"),
            Some(&owner_token),
            Some(json!({ "status": "submitted" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]["submitted_at"].is_string());

    let rows = Notification::list_by_user(&ctx.db, member.id, false, 10)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].kind, NotificationKind::ApprovalStatus);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_notifications_are_owner_scoped() {
    let Some(mut ctx) = TestContext::try_new().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let (_, owner_token) = ctx.create_user(GlobalRole::Member).await;
    let (assignee, assignee_token) = ctx.create_user(GlobalRole::Member).await;
    let (_other, other_token) = ctx.create_user(GlobalRole::Member).await;
    let project_id = create_project(&mut ctx, &owner_token, "Scoped Rows").await;
    add_member(&mut ctx, &owner_token, project_id, assignee.id, "member").await;

    let response = ctx
        .app
        .call(request(
            Method::POST,
            "/api/tasks",
            Some(&owner_token),
            Some(json!({
                "project_id": project_id,
                "title": "Inspect rebar",
                "assigned_to": assignee.id,
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // The assignee sees it and can mark it read
    let response = ctx
        .app
        .call(request(
            Method::GET,
            "/api/notifications?unread_only=true",
            Some(&assignee_token),
            None,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["count"], 1);
    let notification_id = body["data"][0]["id"].as_str().unwrap().to_string();

    // Someone else cannot mark it read; the row does not exist for them
    let response = ctx
        .app
        .call(request(
            Method::PUT,
            &format!("/api/notifications?id={notification_id}"),
            Some(&other_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .app
        .call(request(
            Method::PUT,
            &format!("/api/notifications?id={notification_id}"),
            Some(&assignee_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_read"], true);

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_preferences_default_then_upsert() {
    let Some(mut ctx) = TestContext::try_new().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let (_, token) = ctx.create_user(GlobalRole::Member).await;

    // No stored row: GET returns the defaults instead of 404
    let response = ctx
        .app
        .call(request(
            Method::GET,
            "/api/notification-preferences",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["email_task_assigned"], true);
    assert_eq!(body["data"]["email_mentions"], true);

    // Upsert an opt-out and read it back
    let response = ctx
        .app
        .call(request(
            Method::PUT,
            "/api/notification-preferences",
            Some(&token),
            Some(json!({ "email_mentions": false })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .app
        .call(request(
            Method::GET,
            "/api/notification-preferences",
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["email_mentions"], false);
    assert_eq!(body["data"]["email_task_assigned"], true);

    ctx.cleanup().await;
}
