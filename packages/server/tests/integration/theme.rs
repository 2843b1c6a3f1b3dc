use serde_json::json;

use crate::common::{TestApp, routes};

mod themes {
    use super::*;

    #[tokio::test]
    async fn theme_lists_team_count_and_judge() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        app.create_team(&admin, "Alpha", theme).await;
        let judge = app.create_judge(&admin, "Grace", theme).await;

        let res = app.get_with_token(&routes::theme(theme), &admin).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"], "AI");
        assert_eq!(res.body["team_count"], 1);
        assert_eq!(res.body["judge_id"], judge.id);

        let list = app.get_with_token(routes::THEMES, &admin).await;
        assert_eq!(list.body[0]["team_count"], 1);
        assert_eq!(list.body[0]["judge_id"], judge.id);
    }

    #[tokio::test]
    async fn duplicate_theme_name_is_a_conflict() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        app.create_theme(&admin, "AI").await;

        let res = app
            .post_with_token(routes::THEMES, &json!({"name": "AI"}), &admin)
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn invalid_cap_is_rejected() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;

        let res = app
            .post_with_token(routes::THEMES, &json!({"name": "AI", "max_teams": 0}), &admin)
            .await;

        assert_eq!(res.status, 400);
    }

    #[tokio::test]
    async fn cap_cannot_drop_below_team_count() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        app.create_team(&admin, "Alpha", theme).await;
        app.create_team(&admin, "Beta", theme).await;

        let res = app
            .put_with_token(&routes::theme(theme), &json!({"max_teams": 1}), &admin)
            .await;
        assert_eq!(res.status, 409);

        let res = app
            .put_with_token(&routes::theme(theme), &json!({"max_teams": 2}), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["max_teams"], 2);

        let res = app
            .put_with_token(&routes::theme(theme), &json!({"max_teams": null}), &admin)
            .await;
        assert_eq!(res.status, 200);
        assert!(res.body["max_teams"].is_null());
    }

    #[tokio::test]
    async fn referenced_theme_cannot_be_deleted() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        app.create_team(&admin, "Alpha", theme).await;

        let res = app.delete_with_token(&routes::theme(theme), &admin).await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn unused_theme_can_be_deleted() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;

        assert_eq!(app.delete_with_token(&routes::theme(theme), &admin).await.status, 204);
        assert_eq!(app.get_with_token(&routes::theme(theme), &admin).await.status, 404);
    }

    #[tokio::test]
    async fn participants_cannot_create_themes() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let team = app.create_team(&admin, "Alpha", theme).await;

        let res = app
            .post_with_token(routes::THEMES, &json!({"name": "Web"}), &team.token)
            .await;

        assert_eq!(res.status, 403);
    }
}

mod judges {
    use super::*;

    #[tokio::test]
    async fn judge_gets_one_time_credentials() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;

        let res = app
            .post_with_token(
                routes::JUDGES,
                &json!({"name": "Grace Hopper", "theme_id": theme}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["judge"]["theme_id"], theme);
        assert_eq!(res.body["judge"]["first_login"], true);
        assert_eq!(res.body["credentials"]["username"], "judge_grace_hopper");
        assert_eq!(res.body["credentials"]["password"], "judge_grace_hopper");
    }

    #[tokio::test]
    async fn theme_accepts_a_single_judge() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        app.create_judge(&admin, "Grace", theme).await;

        let res = app
            .post_with_token(
                routes::JUDGES,
                &json!({"name": "Linus", "theme_id": theme}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn taken_username_is_reported() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;

        let res = app
            .post_with_token(
                routes::JUDGES,
                &json!({"name": "Grace", "theme_id": theme, "username": "admin"}),
                &admin,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn judge_cannot_move_onto_a_judged_theme() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let ai = app.create_theme(&admin, "AI").await;
        let web = app.create_theme(&admin, "Web").await;
        app.create_judge(&admin, "Grace", ai).await;
        let linus = app.create_judge(&admin, "Linus", web).await;

        let res = app
            .put_with_token(&routes::judge(linus.id), &json!({"theme_id": ai}), &admin)
            .await;
        assert_eq!(res.status, 409);

        let free = app.create_theme(&admin, "Data").await;
        let res = app
            .put_with_token(&routes::judge(linus.id), &json!({"theme_id": free}), &admin)
            .await;
        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["theme_id"], free);
    }

    #[tokio::test]
    async fn deleting_a_judge_removes_their_evaluations() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let team = app.create_team(&admin, "Alpha", theme).await;
        let judge = app.create_judge(&admin, "Grace", theme).await;
        app.evaluate(&judge.token, team.id, 1, 9.0).await;

        let res = app.delete_with_token(&routes::judge(judge.id), &admin).await;
        assert_eq!(res.status, 204, "{}", res.text);

        let all = app.get_with_token(routes::ALL_EVALUATIONS, &admin).await;
        assert_eq!(all.body, json!([]));
        assert_eq!(app.get_with_token(&routes::judge(judge.id), &admin).await.status, 404);

        // The theme is free again.
        app.create_judge(&admin, "Linus", theme).await;
    }

    #[tokio::test]
    async fn judges_are_listed_for_admins_only() {
        let app = TestApp::spawn().await;
        let admin = app.admin_token().await;
        let theme = app.create_theme(&admin, "AI").await;
        let judge = app.create_judge(&admin, "Grace", theme).await;

        let list = app.get_with_token(routes::JUDGES, &admin).await;
        assert_eq!(list.body.as_array().unwrap().len(), 1);

        let denied = app.get_with_token(routes::JUDGES, &judge.token).await;
        assert_eq!(denied.status, 403);
    }
}
