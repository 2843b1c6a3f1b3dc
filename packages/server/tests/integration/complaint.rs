use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn participant_files_a_complaint_for_their_team() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let theme = app.create_theme(&admin, "AI").await;
    let team = app.create_team(&admin, "Alpha", theme).await;

    let res = app
        .post_with_token(
            routes::COMPLAINTS,
            &json!({"type": "TECHNICAL", "description": "Wi-Fi dropped during the demo"}),
            &team.token,
        )
        .await;

    assert_eq!(res.status, 201, "{}", res.text);
    assert_eq!(res.body["team_id"], team.id);
    assert_eq!(res.body["team_name"], "Alpha");
    assert_eq!(res.body["type"], "TECHNICAL");
    assert_eq!(res.body["status"], "PENDING");
    assert!(res.body["resolved_by"].is_null());
}

#[tokio::test]
async fn empty_description_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let theme = app.create_theme(&admin, "AI").await;
    let team = app.create_team(&admin, "Alpha", theme).await;

    let res = app
        .post_with_token(
            routes::COMPLAINTS,
            &json!({"type": "OTHER", "description": "   "}),
            &team.token,
        )
        .await;

    assert_eq!(res.status, 400);
}

#[tokio::test]
async fn judges_cannot_file_complaints() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let theme = app.create_theme(&admin, "AI").await;
    let judge = app.create_judge(&admin, "Grace", theme).await;

    let res = app
        .post_with_token(
            routes::COMPLAINTS,
            &json!({"type": "OTHER", "description": "Too much coffee"}),
            &judge.token,
        )
        .await;

    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn participants_list_only_their_own_complaints() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let theme = app.create_theme(&admin, "AI").await;
    let alpha = app.create_team(&admin, "Alpha", theme).await;
    let beta = app.create_team(&admin, "Beta", theme).await;
    for token in [&alpha.token, &beta.token] {
        app.post_with_token(
            routes::COMPLAINTS,
            &json!({"type": "EVALUATION", "description": "Please re-check"}),
            token,
        )
        .await;
    }

    let own = app.get_with_token(routes::COMPLAINTS, &alpha.token).await;
    assert_eq!(own.status, 200, "{}", own.text);
    let rows = own.body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["team_id"], alpha.id);

    let all = app.get_with_token(routes::COMPLAINTS, &admin).await;
    assert_eq!(all.body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn admin_resolves_a_complaint_once() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let admin_id = app.get_with_token(routes::ME, &admin).await.id();
    let theme = app.create_theme(&admin, "AI").await;
    let team = app.create_team(&admin, "Alpha", theme).await;
    let id = app
        .post_with_token(
            routes::COMPLAINTS,
            &json!({"type": "TECHNICAL", "description": "Power outage"}),
            &team.token,
        )
        .await
        .id();

    let res = app
        .put_with_token(&routes::complaint_resolve(id), &json!({}), &admin)
        .await;
    assert_eq!(res.status, 200, "{}", res.text);
    assert_eq!(res.body["status"], "RESOLVED");
    assert_eq!(res.body["resolved_by"], admin_id);
    assert!(res.body["resolved_at"].is_string());

    let again = app
        .put_with_token(&routes::complaint_resolve(id), &json!({}), &admin)
        .await;
    assert_eq!(again.status, 409);
    assert_eq!(again.body["code"], "CONFLICT");
}

#[tokio::test]
async fn admin_can_filter_by_status() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let theme = app.create_theme(&admin, "AI").await;
    let team = app.create_team(&admin, "Alpha", theme).await;
    let mut ids = Vec::new();
    for description in ["First", "Second"] {
        let res = app
            .post_with_token(
                routes::COMPLAINTS,
                &json!({"type": "OTHER", "description": description}),
                &team.token,
            )
            .await;
        ids.push(res.id());
    }
    app.put_with_token(&routes::complaint_resolve(ids[0]), &json!({}), &admin)
        .await;

    let pending = app
        .get_with_token(&format!("{}?status=PENDING", routes::COMPLAINTS), &admin)
        .await;
    let rows = pending.body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], ids[1]);
}

#[tokio::test]
async fn participants_cannot_resolve() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let theme = app.create_theme(&admin, "AI").await;
    let team = app.create_team(&admin, "Alpha", theme).await;
    let id = app
        .post_with_token(
            routes::COMPLAINTS,
            &json!({"type": "OTHER", "description": "Noise"}),
            &team.token,
        )
        .await
        .id();

    let res = app
        .put_with_token(&routes::complaint_resolve(id), &json!({}), &team.token)
        .await;

    assert_eq!(res.status, 403);
}

#[tokio::test]
async fn resolving_a_missing_complaint_is_not_found() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let res = app
        .put_with_token(&routes::complaint_resolve(999), &json!({}), &admin)
        .await;

    assert_eq!(res.status, 404);
}
