use serde_json::json;

use crate::common::{TestApp, routes};

#[tokio::test]
async fn single_round_score_is_averaged_over_three_rounds() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let theme = app.create_theme(&admin, "AI").await;
    let team = app.create_team(&admin, "Alpha", theme).await;
    let judge = app.create_judge(&admin, "Grace", theme).await;

    assert_eq!(app.set_round(&admin, 1, "ACTIVE").await.status, 200);
    let ready = app
        .post_with_token(
            &routes::team_ready(team.id),
            &json!({"round": 1, "ready": true}),
            &team.token,
        )
        .await;
    assert_eq!(ready.status, 200, "{}", ready.text);
    assert_eq!(ready.body["visible_to_judges"], true);

    let queue = app.get_with_token(routes::JUDGE_QUEUE, &judge.token).await;
    assert_eq!(queue.body["teams"][0]["team_id"], team.id);

    let scored = app.evaluate(&judge.token, team.id, 1, 8.5).await;
    assert_eq!(scored.status, 201, "{}", scored.text);
    assert_eq!(scored.body["score"], 8.5);

    let res = app.get_with_token(routes::LEADERBOARD, &admin).await;

    assert_eq!(res.status, 200, "{}", res.text);
    let row = &res.body["standings"][0];
    assert_eq!(row["rank"], 1);
    assert_eq!(row["team_name"], "Alpha");
    assert_eq!(row["theme_name"], "AI");
    assert_eq!(row["round1_avg"], 8.5);
    assert_eq!(row["round1_count"], 1);
    assert_eq!(row["round2_avg"], 0.0);
    assert_eq!(row["round2_count"], 0);
    assert_eq!(row["overall_avg"], 2.83);
}

#[tokio::test]
async fn teams_are_ranked_by_overall_average() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let ai = app.create_theme(&admin, "AI").await;
    let web = app.create_theme(&admin, "Web").await;
    let alpha = app.create_team(&admin, "Alpha", ai).await;
    let beta = app.create_team(&admin, "Beta", web).await;
    let idle = app.create_team(&admin, "Gamma", ai).await;
    let ai_judge = app.create_judge(&admin, "Grace", ai).await;
    let web_judge = app.create_judge(&admin, "Linus", web).await;

    app.evaluate(&ai_judge.token, alpha.id, 1, 8.5).await;
    app.evaluate(&web_judge.token, beta.id, 1, 9.0).await;
    app.evaluate(&web_judge.token, beta.id, 2, 7.0).await;

    let res = app.get_with_token(routes::LEADERBOARD, &admin).await;
    let standings = res.body["standings"].as_array().unwrap();

    let order: Vec<i64> = standings
        .iter()
        .map(|s| s["team_id"].as_i64().unwrap())
        .collect();
    assert_eq!(order, vec![beta.id as i64, alpha.id as i64, idle.id as i64]);
    assert_eq!(standings[0]["overall_avg"], 5.33);
    assert_eq!(standings[2]["overall_avg"], 0.0);
    assert_eq!(standings[2]["rank"], 3);
}

#[tokio::test]
async fn unscored_teams_keep_registration_order() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let theme = app.create_theme(&admin, "AI").await;
    let first = app.create_team(&admin, "Zulu", theme).await;
    let second = app.create_team(&admin, "Alpha", theme).await;

    let res = app.get_with_token(routes::LEADERBOARD, &admin).await;
    let standings = res.body["standings"].as_array().unwrap();

    assert_eq!(standings[0]["team_id"], first.id);
    assert_eq!(standings[1]["team_id"], second.id);
}

#[tokio::test]
async fn empty_event_has_empty_leaderboard() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let res = app.get_with_token(routes::LEADERBOARD, &admin).await;

    assert_eq!(res.status, 200);
    assert_eq!(res.body["standings"], json!([]));
}

#[tokio::test]
async fn leaderboard_is_admin_only() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let theme = app.create_theme(&admin, "AI").await;
    let team = app.create_team(&admin, "Alpha", theme).await;
    let judge = app.create_judge(&admin, "Grace", theme).await;

    assert_eq!(app.get_with_token(routes::LEADERBOARD, &team.token).await.status, 403);
    assert_eq!(app.get_with_token(routes::LEADERBOARD, &judge.token).await.status, 403);
}
