use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use server::entity::evaluation;

use crate::common::{TestApp, routes};

mod submission {
    use super::*;

    #[tokio::test]
    async fn judge_can_score_a_team_of_their_theme() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let team = app.create_team(&admin, "Alpha", theme).await;
        let judge = app.create_judge(&admin, "Grace", theme).await;

        let res = app
            .post_with_token(
                routes::EVALUATIONS,
                &json!({
                    "team_id": team.id,
                    "round": 1,
                    "score": 8.5,
                    "criteria": {"innovation": 9, "execution": 8},
                    "feedback": "  Solid demo  ",
                }),
                &judge.token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["score"], 8.5);
        assert_eq!(res.body["team_name"], "Alpha");
        assert_eq!(res.body["judge_name"], "Grace");
        assert_eq!(res.body["judge_id"], judge.id);
        assert_eq!(res.body["feedback"], "Solid demo");
        assert_eq!(res.body["criteria"]["innovation"], 9.0);
    }

    #[tokio::test]
    async fn second_evaluation_in_same_round_is_a_conflict() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let team = app.create_team(&admin, "Alpha", theme).await;
        let judge = app.create_judge(&admin, "Grace", theme).await;

        assert_eq!(app.evaluate(&judge.token, team.id, 1, 7.0).await.status, 201);
        let res = app.evaluate(&judge.token, team.id, 1, 9.0).await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
        assert!(
            res.body["message"]
                .as_str()
                .unwrap()
                .contains("already evaluated")
        );

        let all = app.get_with_token(routes::ALL_EVALUATIONS, &admin).await;
        let rows = all.body.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["score"], 7.0);
    }

    #[tokio::test]
    async fn simultaneous_duplicate_submissions_store_one_row() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let team = app.create_team(&admin, "Alpha", theme).await;
        let judge = app.create_judge(&admin, "Grace", theme).await;

        let (a, b, c, d, e, f) = tokio::join!(
            app.evaluate(&judge.token, team.id, 2, 5.0),
            app.evaluate(&judge.token, team.id, 2, 6.0),
            app.evaluate(&judge.token, team.id, 2, 7.0),
            app.evaluate(&judge.token, team.id, 2, 8.0),
            app.evaluate(&judge.token, team.id, 2, 9.0),
            app.evaluate(&judge.token, team.id, 2, 10.0),
        );
        let responses = [a, b, c, d, e, f];

        let created: Vec<_> = responses.iter().filter(|r| r.status == 201).collect();
        assert_eq!(created.len(), 1, "exactly one submission should win");
        for res in responses.iter().filter(|r| r.status != 201) {
            assert_eq!(res.status, 409, "{}", res.text);
            assert_eq!(res.body["code"], "CONFLICT");
        }

        let stored = evaluation::Entity::find()
            .filter(evaluation::Column::TeamId.eq(team.id))
            .filter(evaluation::Column::JudgeId.eq(judge.id))
            .filter(evaluation::Column::Round.eq(2))
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(stored, 1);

        let all = app.get_with_token(routes::ALL_EVALUATIONS, &admin).await;
        assert_eq!(all.body[0]["score"], created[0].body["score"]);
    }

    #[tokio::test]
    async fn same_team_can_be_scored_in_each_round() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let team = app.create_team(&admin, "Alpha", theme).await;
        let judge = app.create_judge(&admin, "Grace", theme).await;

        for round in 1..=3 {
            let res = app.evaluate(&judge.token, team.id, round, 6.0).await;
            assert_eq!(res.status, 201, "round {round}: {}", res.text);
        }
    }

    #[tokio::test]
    async fn judge_of_another_theme_is_forbidden() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let ai = app.create_theme(&admin, "AI").await;
        let web = app.create_theme(&admin, "Web").await;
        let team = app.create_team(&admin, "Alpha", ai).await;
        let judge = app.create_judge(&admin, "Linus", web).await;

        let res = app.evaluate(&judge.token, team.id, 1, 7.0).await;
        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");

        // Authorization is decided before the score is looked at.
        let res = app.evaluate(&judge.token, team.id, 1, 42.0).await;
        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn out_of_range_input_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let team = app.create_team(&admin, "Alpha", theme).await;
        let judge = app.create_judge(&admin, "Grace", theme).await;

        for (round, score) in [(1, 10.5), (1, -0.5), (4, 5.0), (0, 5.0)] {
            let res = app.evaluate(&judge.token, team.id, round, score).await;
            assert_eq!(res.status, 400, "round {round} score {score}: {}", res.text);
            assert_eq!(res.body["code"], "VALIDATION_ERROR");
        }

        let res = app
            .post_with_token(
                routes::EVALUATIONS,
                &json!({"team_id": team.id, "round": 1, "score": 5, "criteria": {"design": 11}}),
                &judge.token,
            )
            .await;
        assert_eq!(res.status, 400);

        let all = app.get_with_token(routes::ALL_EVALUATIONS, &admin).await;
        assert_eq!(all.body, json!([]));
    }

    #[tokio::test]
    async fn boundary_scores_are_accepted() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let team = app.create_team(&admin, "Alpha", theme).await;
        let judge = app.create_judge(&admin, "Grace", theme).await;

        assert_eq!(app.evaluate(&judge.token, team.id, 1, 0.0).await.status, 201);
        assert_eq!(app.evaluate(&judge.token, team.id, 2, 10.0).await.status, 201);
    }

    #[tokio::test]
    async fn unknown_team_is_not_found() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let judge = app.create_judge(&admin, "Grace", theme).await;

        let res = app.evaluate(&judge.token, 999, 1, 5.0).await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn participants_and_admins_cannot_submit() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let team = app.create_team(&admin, "Alpha", theme).await;

        assert_eq!(app.evaluate(&team.token, team.id, 1, 10.0).await.status, 403);
        assert_eq!(app.evaluate(&admin, team.id, 1, 10.0).await.status, 403);
    }
}

mod queue {
    use super::*;

    #[tokio::test]
    async fn queue_is_empty_while_no_round_is_active() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let team = app.create_team(&admin, "Alpha", theme).await;
        let judge = app.create_judge(&admin, "Grace", theme).await;
        app.post_with_token(
            &routes::team_ready(team.id),
            &json!({"round": 1, "ready": true}),
            &team.token,
        )
        .await;

        let res = app.get_with_token(routes::JUDGE_QUEUE, &judge.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["round"], 1);
        assert_eq!(res.body["status"], "LOCKED");
        assert_eq!(res.body["teams"], json!([]));
    }

    #[tokio::test]
    async fn queue_lists_only_ready_teams_in_gated_rounds() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let ready = app.create_team(&admin, "Alpha", theme).await;
        app.create_team(&admin, "Beta", theme).await;
        let judge = app.create_judge(&admin, "Grace", theme).await;
        app.post_with_token(
            &routes::team_ready(ready.id),
            &json!({"round": 1, "ready": true}),
            &ready.token,
        )
        .await;
        app.set_round(&admin, 1, "ACTIVE").await;

        let res = app.get_with_token(routes::JUDGE_QUEUE, &judge.token).await;
        let teams = res.body["teams"].as_array().unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0]["team_id"], ready.id);
        assert_eq!(teams[0]["evaluated"], false);

        app.evaluate(&judge.token, ready.id, 1, 8.0).await;
        let res = app.get_with_token(routes::JUDGE_QUEUE, &judge.token).await;
        assert_eq!(res.body["teams"][0]["evaluated"], true);
    }

    #[tokio::test]
    async fn final_round_queue_lists_every_team() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        app.create_team(&admin, "Alpha", theme).await;
        app.create_team(&admin, "Beta", theme).await;
        let judge = app.create_judge(&admin, "Grace", theme).await;
        app.set_round(&admin, 3, "ACTIVE").await;

        let res = app.get_with_token(routes::JUDGE_QUEUE, &judge.token).await;

        assert_eq!(res.body["round"], 3);
        assert_eq!(res.body["teams"].as_array().unwrap().len(), 2);
    }
}

mod projections {
    use super::*;

    #[tokio::test]
    async fn judge_lists_own_evaluations() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let alpha = app.create_team(&admin, "Alpha", theme).await;
        let beta = app.create_team(&admin, "Beta", theme).await;
        let judge = app.create_judge(&admin, "Grace", theme).await;
        app.evaluate(&judge.token, alpha.id, 1, 7.0).await;
        app.evaluate(&judge.token, beta.id, 1, 6.0).await;

        let res = app.get_with_token(routes::JUDGE_EVALUATIONS, &judge.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        let rows = res.body.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().any(|r| r["team_name"] == "Alpha"));
        assert!(rows.iter().any(|r| r["team_name"] == "Beta"));
    }

    #[tokio::test]
    async fn participant_sees_which_rounds_were_scored() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let team = app.create_team(&admin, "Alpha", theme).await;
        let judge = app.create_judge(&admin, "Grace", theme).await;
        app.evaluate(&judge.token, team.id, 2, 7.0).await;

        let res = app.get_with_token(routes::MY_TEAM_EVALUATIONS, &team.token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["team_id"], team.id);
        assert_eq!(res.body["round1_evaluated"], false);
        assert_eq!(res.body["round2_evaluated"], true);
        assert_eq!(res.body["round3_evaluated"], false);
        assert!(res.body.get("score").is_none());
    }

    #[tokio::test]
    async fn team_evaluations_are_limited_to_admin_and_theme_judge() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let ai = app.create_theme(&admin, "AI").await;
        let web = app.create_theme(&admin, "Web").await;
        let team = app.create_team(&admin, "Alpha", ai).await;
        let judge = app.create_judge(&admin, "Grace", ai).await;
        let outsider = app.create_judge(&admin, "Linus", web).await;
        app.evaluate(&judge.token, team.id, 1, 7.0).await;

        let by_admin = app.get_with_token(&routes::team_evaluations(team.id), &admin).await;
        assert_eq!(by_admin.status, 200);
        assert_eq!(by_admin.body.as_array().unwrap().len(), 1);

        let by_judge = app
            .get_with_token(&routes::team_evaluations(team.id), &judge.token)
            .await;
        assert_eq!(by_judge.status, 200);

        let by_outsider = app
            .get_with_token(&routes::team_evaluations(team.id), &outsider.token)
            .await;
        assert_eq!(by_outsider.status, 403);

        let by_team = app
            .get_with_token(&routes::team_evaluations(team.id), &team.token)
            .await;
        assert_eq!(by_team.status, 403);
    }

    #[tokio::test]
    async fn only_admins_list_every_evaluation() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let judge = app.create_judge(&admin, "Grace", theme).await;

        let res = app.get_with_token(routes::ALL_EVALUATIONS, &judge.token).await;

        assert_eq!(res.status, 403);
    }
}
