use common::{Role, RoundStatus};
use sea_orm::sea_query::{Index, OnConflict, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::config::AppConfig;
use crate::entity::{complaint, evaluation, hackathon, user};
use crate::utils::hash;

/// Prepare a freshly synced database: the event row, the organizer account
/// and the indexes schema-sync cannot express. Safe to run on every start.
pub async fn bootstrap(db: &DatabaseConnection, config: &AppConfig) -> Result<(), DbErr> {
    ensure_hackathon(db, config).await?;
    ensure_admin(db, config).await?;
    ensure_indexes(db).await
}

/// Insert the single event row unless it already exists.
pub async fn ensure_hackathon(db: &DatabaseConnection, config: &AppConfig) -> Result<(), DbErr> {
    let now = chrono::Utc::now();
    let model = hackathon::ActiveModel {
        id: Set(hackathon::SINGLETON_ID),
        name: Set(config.hackathon.name.clone()),
        description: Set(String::new()),
        start_time: Set(now),
        end_time: Set(now + chrono::Duration::days(2)),
        current_round: Set(1),
        round1_status: Set(RoundStatus::Locked),
        round2_status: Set(RoundStatus::Locked),
        round3_status: Set(RoundStatus::Locked),
        updated_at: Set(now),
    };

    let result = hackathon::Entity::insert(model)
        .on_conflict(
            OnConflict::column(hackathon::Column::Id)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => info!(name = %config.hackathon.name, "Bootstrapped hackathon"),
        Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Create the organizer account on first start. An existing account with
/// the same username is left untouched, password included.
pub async fn ensure_admin(db: &DatabaseConnection, config: &AppConfig) -> Result<(), DbErr> {
    let username = config.bootstrap.admin_username.trim();
    if config.bootstrap.admin_password.is_empty() {
        tracing::warn!("bootstrap.admin_password is empty; skipping admin account creation");
        return Ok(());
    }

    let password = hash::hash_password(&config.bootstrap.admin_password)
        .map_err(|e| DbErr::Custom(format!("Password hash error: {e}")))?;

    let model = user::ActiveModel {
        username: Set(username.to_string()),
        name: Set("Administrator".into()),
        password: Set(password),
        role: Set(Role::Admin),
        theme_id: Set(None),
        first_login: Set(false),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let result = user::Entity::insert(model)
        .on_conflict(
            OnConflict::column(user::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    match result {
        Ok(_) => info!(username, "Created admin account"),
        Err(DbErr::RecordNotInserted) => {}
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Leaderboard and per-team reads:
    // SELECT ... FROM evaluation WHERE team_id = ? ORDER BY round
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_evaluation_team_round")
        .table(evaluation::Entity)
        .col(evaluation::Column::TeamId)
        .col(evaluation::Column::Round)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_evaluation_team_round exists"),
        Err(e) => tracing::warn!("Failed to create index idx_evaluation_team_round: {}", e),
    }

    // Admin complaint inbox: filter by status, newest first
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_complaint_status_created")
        .table(complaint::Entity)
        .col(complaint::Column::Status)
        .col(complaint::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => info!("Ensured index idx_complaint_status_created exists"),
        Err(e) => tracing::warn!("Failed to create index idx_complaint_status_created: {}", e),
    }

    Ok(())
}
