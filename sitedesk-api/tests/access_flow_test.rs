/// Project access-control flows against a live database
///
/// Run with `DATABASE_URL` pointing at a scratch PostgreSQL database; every
/// test skips cleanly when it is not set.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, request, TestContext};
use serde_json::json;
use sitedesk_shared::models::project::Project;
use sitedesk_shared::models::user::GlobalRole;
use tower::Service as _;
use uuid::Uuid;

/// Creates a project through the API and returns its ID
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

    let body = body_json(response).await;
    body["data"]["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_creator_has_implicit_ownership() {
    let Some(mut ctx) = TestContext::try_new().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let (_, token) = ctx.create_user(GlobalRole::Member).await;
    let project_id = create_project(&mut ctx, &token, "Riverside Office Complex").await;

    // No membership row was written, access comes from creatorship
    let response = ctx
        .app
        .call(request(
            Method::GET,
            &format!("/api/projects?id={project_id}"),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["my_role"], "owner");

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_stranger_denied_until_added_as_member() {
    let Some(mut ctx) = TestContext::try_new().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let (_, owner_token) = ctx.create_user(GlobalRole::Member).await;
    let (stranger, stranger_token) = ctx.create_user(GlobalRole::Member).await;
    let project_id = create_project(&mut ctx, &owner_token, "Harbor Crane Upgrade").await;

    let response = ctx
        .app
        .call(request(
            Method::GET,
            &format!("/api/projects?id={project_id}"),
            Some(&stranger_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["error"], "forbidden");

    // Owner adds them as a consultant
    let response = ctx
        .app
        .call(request(
            Method::POST,
            "/api/project-members",
            Some(&owner_token),
            Some(json!({
                "project_id": project_id,
                "user_id": stranger.id,
                "role": "consultant"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .call(request(
            Method::GET,
            &format!("/api/projects?id={project_id}"),
            Some(&stranger_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["my_role"], "consultant");

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_viewer_cannot_mutate_project() {
    let Some(mut ctx) = TestContext::try_new().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let (_, owner_token) = ctx.create_user(GlobalRole::Member).await;
    let (viewer, viewer_token) = ctx.create_user(GlobalRole::Member).await;
    let project_id = create_project(&mut ctx, &owner_token, "Clinic Extension").await;

    let response = ctx
        .app
        .call(request(
            Method::POST,
            "/api/project-members",
            Some(&owner_token),
            Some(json!({
                "project_id": project_id,
                "user_id": viewer.id,
                "role": "viewer"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .call(request(
            Method::PUT,
            &format!("/api/projects?id={project_id}"),
            Some(&viewer_token),
            Some(json!({ "name": "Hijacked" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The row is unchanged
    let project = Project::find(&ctx.db, project_id).await.unwrap().unwrap();
    assert_eq!(project.name, "Clinic Extension");

    // And deletion is out of reach too
    let response = ctx
        .app
        .call(request(
            Method::DELETE,
            &format!("/api/projects?id={project_id}"),
            Some(&viewer_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(Project::find(&ctx.db, project_id).await.unwrap().is_some());

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_admin_bypass_is_company_scoped() {
    let Some(mut ctx) = TestContext::try_new().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let (_, owner_token) = ctx.create_user(GlobalRole::Member).await;
    let project_id = create_project(&mut ctx, &owner_token, "Depot Reroofing").await;

    // Same-company admin gets in without a membership row
    let (_, admin_token) = ctx.create_user(GlobalRole::Admin).await;
    let response = ctx
        .app
        .call(request(
            Method::GET,
            &format!("/api/projects?id={project_id}"),
            Some(&admin_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["my_role"], "admin");

    // An admin of another company does not
    let other_company = sitedesk_shared::models::company::Company::create(
        &ctx.db,
        sitedesk_shared::models::company::CreateCompany {
            name: format!("Other Firm {}", Uuid::new_v4()),
        },
    )
    .await
    .unwrap();
    let (_, foreign_admin_token) = ctx
        .create_user_in(GlobalRole::Admin, Some(other_company.id))
        .await;

    let response = ctx
        .app
        .call(request(
            Method::GET,
            &format!("/api/projects?id={project_id}"),
            Some(&foreign_admin_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // And a companyless admin never matches the bypass
    let (_, stray_admin_token) = ctx.create_user_in(GlobalRole::Admin, None).await;
    let response = ctx
        .app
        .call(request(
            Method::GET,
            &format!("/api/projects?id={project_id}"),
            Some(&stray_admin_token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    sqlx::query("DELETE FROM companies WHERE id = $1")
        .bind(other_company.id)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await;
}

#[tokio::test]
async fn test_contribute_tier_gates_member_management() {
    let Some(mut ctx) = TestContext::try_new().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let (_, owner_token) = ctx.create_user(GlobalRole::Member).await;
    let (consultant, consultant_token) = ctx.create_user(GlobalRole::Consultant).await;
    let (outsider, _) = ctx.create_user(GlobalRole::Member).await;
    let project_id = create_project(&mut ctx, &owner_token, "Substation Fence").await;

    let response = ctx
        .app
        .call(request(
            Method::POST,
            "/api/project-members",
            Some(&owner_token),
            Some(json!({
                "project_id": project_id,
                "user_id": consultant.id,
                "role": "consultant"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // A consultant can contribute but cannot manage membership
    let response = ctx
        .app
        .call(request(
            Method::POST,
            "/api/project-members",
            Some(&consultant_token),
            Some(json!({
                "project_id": project_id,
                "user_id": outsider.id,
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Duplicate add by the owner is a conflict
    let response = ctx
        .app
        .call(request(
            Method::POST,
            "/api/project-members",
            Some(&owner_token),
            Some(json!({
                "project_id": project_id,
                "user_id": consultant.id,
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "conflict");

    ctx.cleanup().await;
}

#[tokio::test]
async fn test_project_listing_mirrors_access() {
    let Some(mut ctx) = TestContext::try_new().await else {
        eprintln!("DATABASE_URL not set, skipping");
        return;
    };

    let (_, owner_token) = ctx.create_user(GlobalRole::Member).await;
    let (member, member_token) = ctx.create_user(GlobalRole::Member).await;
    let first = create_project(&mut ctx, &owner_token, "Listing A").await;
    let _second = create_project(&mut ctx, &owner_token, "Listing B").await;

    // The member only sees the project they were added to
    let response = ctx
        .app
        .call(request(
            Method::POST,
            "/api/project-members",
            Some(&owner_token),
            Some(json!({ "project_id": first, "user_id": member.id })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .call(request(Method::GET, "/api/projects", Some(&member_token), None))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["id"], first.to_string());

    // The creator sees both
    let response = ctx
        .app
        .call(request(Method::GET, "/api/projects", Some(&owner_token), None))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["count"], 2);

    ctx.cleanup().await;
}
