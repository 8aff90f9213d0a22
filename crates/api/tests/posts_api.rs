//! HTTP-level tests for the moderation queue: ingest, listing, workflow,
//! assignment and responses.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{
    body_json, create_agent, delete_auth, expect_json, get_auth, patch_json_auth, post_json_auth,
};
use modus_core::agent::AgentRole;
use modus_core::types::DbId;
use serde_json::json;
use sqlx::PgPool;

const BUG_REPORTS: &str = "33333333-3333-3333-3333-333333333333";

/// A post no seeded rule matches: established author, neutral text.
fn quiet_post(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "body_content": "The export finished but the totals look different.",
        "author_user_id": DbId::new_v4(),
        "author_post_count": 12
    })
}

async fn ingest(app: axum::Router, token: &str, body: serde_json::Value) -> serde_json::Value {
    let json = expect_json(
        post_json_auth(app, "/api/v1/posts", body, token).await,
        StatusCode::CREATED,
    )
    .await;
    json["data"].clone()
}

// ---------------------------------------------------------------------------
// Ingest
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn ingest_derives_priority_from_seeded_rules(pool: PgPool) {
    let (_, token) = create_agent(&pool, "ana@example.com", AgentRole::Agent).await;
    let app = common::build_test_app(pool);

    let post = ingest(app.clone(), &token, quiet_post("Totals differ")).await;
    assert_eq!(post["priority"], "P3");
    assert_eq!(post["status"], "open");
    assert_eq!(post["sentiment_label"], "neutral");

    let mut body = quiet_post("Need this fixed urgently");
    let post = ingest(app.clone(), &token, body.clone()).await;
    assert_eq!(post["priority"], "P1");

    body = quiet_post("First post here");
    body["author_post_count"] = json!(0);
    let post = ingest(app.clone(), &token, body).await;
    assert_eq!(post["priority"], "P2");

    body = quiet_post("Crash on save");
    body["category_id"] = json!(BUG_REPORTS);
    let post = ingest(app.clone(), &token, body).await;
    assert_eq!(post["priority"], "P2");

    body = quiet_post("Unhappy");
    body["sentiment_score"] = json!(-0.8);
    let post = ingest(app.clone(), &token, body).await;
    assert_eq!(post["priority"], "P2");
    assert_eq!(post["sentiment_label"], "negative");

    body = quiet_post("Waiting since this morning");
    body["created_at"] = json!((Utc::now() - Duration::hours(3)).to_rfc3339());
    let post = ingest(app, &token, body).await;
    assert_eq!(post["priority"], "P2");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ingest_ignores_client_priority_and_escapes_content(pool: PgPool) {
    let (_, token) = create_agent(&pool, "ana@example.com", AgentRole::Agent).await;
    let app = common::build_test_app(pool);

    let mut body = quiet_post("Tom & Jerry <3");
    body["priority"] = json!("P1");
    let post = ingest(app, &token, body).await;

    assert_eq!(post["priority"], "P3");
    assert_eq!(post["title"], "Tom &amp; Jerry &lt;3");
    assert_eq!(
        post["excerpt"],
        "The export finished but the totals look different."
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ingest_computes_sentiment_when_absent(pool: PgPool) {
    let (_, token) = create_agent(&pool, "ana@example.com", AgentRole::Agent).await;
    let app = common::build_test_app(pool);

    let mut body = quiet_post("This is terrible");
    body["body_content"] = json!("I hate how broken and useless this is.");
    let post = ingest(app, &token, body).await;

    assert_eq!(post["sentiment_label"], "negative");
    assert!(post["sentiment_score"].as_f64().unwrap() < -0.3);
    // Negative sentiment escalates P3 to P2.
    assert_eq!(post["priority"], "P2");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ingest_rejects_dangerous_and_invalid_input(pool: PgPool) {
    let (_, token) = create_agent(&pool, "ana@example.com", AgentRole::Agent).await;
    let app = common::build_test_app(pool);

    let json = expect_json(
        post_json_auth(
            app.clone(),
            "/api/v1/posts",
            quiet_post("<script>alert(1)</script>"),
            &token,
        )
        .await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(json["error"], "Potentially dangerous pattern detected");

    let mut body = quiet_post("Out of range");
    body["sentiment_score"] = json!(2.0);
    let json = expect_json(
        post_json_auth(app.clone(), "/api/v1/posts", body, &token).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert!(json["error"].as_str().unwrap().starts_with("sentiment_score:"));

    let mut body = quiet_post("Unknown category");
    body["category_id"] = json!(DbId::new_v4());
    let response = post_json_auth(app, "/api/v1/posts", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn list_filters_sorts_and_paginates(pool: PgPool) {
    let (_, token) = create_agent(&pool, "ana@example.com", AgentRole::Agent).await;
    let app = common::build_test_app(pool);

    ingest(app.clone(), &token, quiet_post("Alpha question")).await;
    ingest(app.clone(), &token, quiet_post("Beta urgent issue")).await;
    let mut bug = quiet_post("Gamma crash");
    bug["category_id"] = json!(BUG_REPORTS);
    ingest(app.clone(), &token, bug).await;

    let json = expect_json(get_auth(app.clone(), "/api/v1/posts", &token).await, StatusCode::OK).await;
    assert_eq!(json["meta"]["total"], 3);
    assert_eq!(json["meta"]["page"], 1);
    let priorities: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["priority"].as_str().unwrap())
        .collect();
    assert_eq!(priorities, vec!["P1", "P2", "P3"]);

    let json = body_json(get_auth(app.clone(), "/api/v1/posts?priority=P1,P2", &token).await).await;
    assert_eq!(json["meta"]["total"], 2);

    let json = body_json(
        get_auth(app.clone(), &format!("/api/v1/posts?category_id={BUG_REPORTS}"), &token).await,
    )
    .await;
    assert_eq!(json["meta"]["total"], 1);
    assert_eq!(json["data"][0]["title"], "Gamma crash");

    let json = body_json(get_auth(app.clone(), "/api/v1/posts?search=ALPHA", &token).await).await;
    assert_eq!(json["meta"]["total"], 1);

    let json = body_json(get_auth(app.clone(), "/api/v1/posts?limit=2&page=2", &token).await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["meta"]["pages"], 2);

    let response = get_auth(app.clone(), "/api/v1/posts?priority=P7", &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    for uri in ["/api/v1/posts?status=closed", "/api/v1/posts?sort_by=title"] {
        let json = expect_json(get_auth(app.clone(), uri, &token).await, StatusCode::BAD_REQUEST).await;
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    let response = get_auth(
        app,
        "/api/v1/posts?date_from=2025-02-01&date_to=2025-01-01",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn search_matches_text_with_escaped_characters(pool: PgPool) {
    let (_, token) = create_agent(&pool, "ana@example.com", AgentRole::Agent).await;
    let app = common::build_test_app(pool);

    let post = ingest(app.clone(), &token, quiet_post("I can't log in")).await;
    assert_eq!(post["title"], "I can&#39;t log in");
    ingest(app.clone(), &token, quiet_post("Export of a/b reports")).await;
    ingest(app.clone(), &token, quiet_post("Unrelated question")).await;

    let json = expect_json(
        get_auth(app.clone(), "/api/v1/posts?search=can%27t", &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["meta"]["total"], 1);
    assert_eq!(json["data"][0]["title"], "I can&#39;t log in");

    let json = body_json(get_auth(app, "/api/v1/posts?search=a%2Fb", &token).await).await;
    assert_eq!(json["meta"]["total"], 1);
    assert_eq!(json["data"][0]["title"], "Export of a&#47;b reports");
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn resolving_stamps_resolved_at_and_is_audited(pool: PgPool) {
    let (_, token) = create_agent(&pool, "ana@example.com", AgentRole::Agent).await;
    let app = common::build_test_app(pool);

    let post = ingest(app.clone(), &token, quiet_post("Resolve me")).await;
    let uri = format!("/api/v1/posts/{}", post["id"].as_str().unwrap());

    let response = patch_json_auth(app.clone(), &uri, json!({}), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = expect_json(
        patch_json_auth(app.clone(), &uri, json!({ "status": "resolved" }), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["status"], "resolved");
    assert!(json["data"]["resolved_at"].is_string());

    let json = expect_json(
        patch_json_auth(app.clone(), &uri, json!({ "status": "in_progress" }), &token).await,
        StatusCode::OK,
    )
    .await;
    assert!(json["data"]["resolved_at"].is_null());

    let json = expect_json(
        get_auth(app, &format!("{uri}/audit"), &token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["meta"]["total"], 2);
    assert_eq!(json["data"][0]["action_type"], "update_post");
    assert_eq!(json["data"][0]["previous_state"]["status"], "resolved");
    assert_eq!(json["data"][0]["new_state"]["status"], "in_progress");
    assert_eq!(json["data"][0]["action_details"]["changed_fields"][0], "status");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn claim_and_release(pool: PgPool) {
    let (ana, ana_token) = create_agent(&pool, "ana@example.com", AgentRole::Agent).await;
    let (_, ben_token) = create_agent(&pool, "ben@example.com", AgentRole::Agent).await;
    let (_, sup_token) = create_agent(&pool, "sup@example.com", AgentRole::Supervisor).await;
    let app = common::build_test_app(pool);

    let post = ingest(app.clone(), &ana_token, quiet_post("Claim me")).await;
    let uri = format!("/api/v1/posts/{}", post["id"].as_str().unwrap());

    let json = expect_json(
        post_json_auth(app.clone(), &format!("{uri}/assign"), json!({}), &ana_token).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["assigned_to_id"], ana.id.to_string());
    assert!(json["data"]["assigned_at"].is_string());
    assert_eq!(json["data"]["status"], "open");

    // Another agent cannot take it over or release it.
    let response =
        post_json_auth(app.clone(), &format!("{uri}/assign"), json!({}), &ben_token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let response =
        post_json_auth(app.clone(), &format!("{uri}/release"), json!({}), &ben_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Nor assign it to someone else.
    let response = post_json_auth(
        app.clone(),
        &format!("{uri}/assign"),
        json!({ "agent_id": ana.id }),
        &ben_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A supervisor can release it.
    let json = expect_json(
        post_json_auth(app.clone(), &format!("{uri}/release"), json!({}), &sup_token).await,
        StatusCode::OK,
    )
    .await;
    assert!(json["data"]["assigned_to_id"].is_null());
    assert!(json["data"]["assigned_at"].is_null());

    let json = body_json(get_auth(app, &format!("{uri}/audit"), &ana_token).await).await;
    let actions: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action_type"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["release_post", "assign_post"]);
    assert_eq!(json["data"][1]["action_details"]["reason"], "agent_claimed");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_post_is_404(pool: PgPool) {
    let (_, token) = create_agent(&pool, "ana@example.com", AgentRole::Agent).await;
    let app = common::build_test_app(pool);

    let uri = format!("/api/v1/posts/{}", DbId::new_v4());
    let json = expect_json(get_auth(app.clone(), &uri, &token).await, StatusCode::NOT_FOUND).await;
    assert_eq!(json["code"], "NOT_FOUND");

    let response = get_auth(app, &format!("{uri}/responses"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn responses_are_sanitized_audited_and_author_only(pool: PgPool) {
    let (ana, ana_token) = create_agent(&pool, "ana@example.com", AgentRole::Agent).await;
    let (_, ben_token) = create_agent(&pool, "ben@example.com", AgentRole::Agent).await;
    let app = common::build_test_app(pool);

    let post = ingest(app.clone(), &ana_token, quiet_post("Needs a reply")).await;
    let base = format!("/api/v1/posts/{}/responses", post["id"].as_str().unwrap());

    let json = expect_json(
        post_json_auth(
            app.clone(),
            &base,
            json!({ "content": "Thanks <b>a lot</b>" }),
            &ana_token,
        )
        .await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(json["data"]["content"], "Thanks &lt;b&gt;a lot&lt;&#47;b&gt;");
    assert_eq!(json["data"]["agent_id"], ana.id.to_string());
    assert_eq!(json["data"]["is_internal_note"], false);
    let response_uri = format!("{base}/{}", json["data"]["id"].as_str().unwrap());

    post_json_auth(
        app.clone(),
        &base,
        json!({ "content": "Escalating internally", "is_internal_note": true }),
        &ben_token,
    )
    .await;

    let json = body_json(get_auth(app.clone(), &base, &ana_token).await).await;
    assert_eq!(json["meta"]["total"], 2);
    assert_eq!(json["data"][1]["is_internal_note"], true);

    let response = patch_json_auth(
        app.clone(),
        &response_uri,
        json!({ "content": "Hijacked" }),
        &ben_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let json = expect_json(
        patch_json_auth(
            app.clone(),
            &response_uri,
            json!({ "content": "Thanks again" }),
            &ana_token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["content"], "Thanks again");

    let response = delete_auth(app.clone(), &response_uri, &ben_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = delete_auth(app.clone(), &response_uri, &ana_token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let audit_uri = format!("/api/v1/posts/{}/audit", post["id"].as_str().unwrap());
    let json = body_json(get_auth(app, &audit_uri, &ana_token).await).await;
    let actions: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action_type"].as_str().unwrap())
        .collect();
    assert_eq!(
        actions,
        vec![
            "delete_response",
            "update_response",
            "create_response",
            "create_response"
        ]
    );
    assert_eq!(
        json["data"][3]["action_details"]["content_preview"],
        "Thanks &lt;b&gt;a lot&lt;&#47;b&gt;"
    );
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn suggestion_quotes_public_responses_from_similar_posts(pool: PgPool) {
    let (_, token) = create_agent(&pool, "ana@example.com", AgentRole::Agent).await;
    let app = common::build_test_app(pool);

    let mut near = quiet_post("Export totals off");
    near["embedding"] = json!([1.0, 0.0]);
    let near = ingest(app.clone(), &token, near).await;
    let mut far = quiet_post("Export totals wrong");
    far["embedding"] = json!([0.0, 1.0]);
    let far = ingest(app.clone(), &token, far).await;

    for (post, content, internal) in [
        (&far, "Far answer", false),
        (&near, "Near answer", false),
        (&near, "Internal only", true),
    ] {
        let uri = format!("/api/v1/posts/{}/responses", post["id"].as_str().unwrap());
        let response = post_json_auth(
            app.clone(),
            &uri,
            json!({ "content": content, "is_internal_note": internal }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let mut body = quiet_post("Need this fixed urgently");
    body["embedding"] = json!([0.9, 0.1]);
    let target = ingest(app.clone(), &token, body).await;
    assert_eq!(target["priority"], "P1");

    let json = expect_json(
        post_json_auth(
            app.clone(),
            "/api/v1/ai/suggest",
            json!({ "post_id": target["id"], "max_similar": 1 }),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["similar_response_count"], 1);
    assert_eq!(json["data"]["template_count"], 0);
    assert_eq!(json["data"]["model"], "modus-canned-v1");
    assert!(json["data"]["tokens_used"].as_u64().unwrap() > 0);
    assert!(json["data"]["suggestion"]
        .as_str()
        .unwrap()
        .contains("critical issue"));

    let json = expect_json(
        post_json_auth(
            app.clone(),
            "/api/v1/ai/suggest",
            json!({ "post_id": target["id"], "use_rag": false }),
            &token,
        )
        .await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(json["data"]["similar_response_count"], 0);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/ai/suggest",
        json!({ "post_id": DbId::new_v4() }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        app,
        "/api/v1/ai/suggest",
        json!({ "post_id": target["id"], "max_similar": 11 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
