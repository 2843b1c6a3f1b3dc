use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/hackathon", hackathon_routes())
        .nest("/themes", theme_routes())
        .nest("/teams", team_routes())
        .nest("/judges", judge_routes())
        .nest("/evaluations", evaluation_routes())
        .nest("/leaderboard", leaderboard_routes())
        .nest("/complaints", complaint_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
        .routes(routes!(handlers::auth::change_password))
}

fn hackathon_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::hackathon::get_hackathon,
            handlers::hackathon::update_hackathon
        ))
        .routes(routes!(handlers::hackathon::set_round_status))
        .routes(routes!(
            handlers::hackathon::list_timeline,
            handlers::hackathon::create_slot
        ))
        .routes(routes!(handlers::hackathon::current_slot))
        .routes(routes!(
            handlers::hackathon::update_slot,
            handlers::hackathon::delete_slot
        ))
        .routes(routes!(handlers::hackathon::get_stats))
}

fn theme_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::theme::list_themes,
            handlers::theme::create_theme
        ))
        .routes(routes!(
            handlers::theme::get_theme,
            handlers::theme::update_theme,
            handlers::theme::delete_theme
        ))
}

fn team_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::team::list_teams,
            handlers::team::create_team
        ))
        .routes(routes!(
            handlers::team::get_team,
            handlers::team::update_team,
            handlers::team::delete_team
        ))
        .routes(routes!(handlers::team::set_team_readiness))
        .routes(routes!(handlers::team::get_team_readiness))
}

fn judge_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::judge::list_judges,
            handlers::judge::create_judge
        ))
        .routes(routes!(
            handlers::judge::get_judge,
            handlers::judge::update_judge,
            handlers::judge::delete_judge
        ))
}

fn evaluation_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::evaluation::submit))
        .routes(routes!(handlers::evaluation::list_judge_evaluations))
        .routes(routes!(handlers::evaluation::get_judge_queue))
        .routes(routes!(handlers::evaluation::my_team_status))
        .routes(routes!(handlers::evaluation::list_team_evaluations))
        .routes(routes!(handlers::evaluation::list_all_evaluations))
}

fn leaderboard_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::leaderboard::get_leaderboard))
}

fn complaint_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::complaint::list_complaints,
            handlers::complaint::create_complaint
        ))
        .routes(routes!(handlers::complaint::resolve_complaint))
}
