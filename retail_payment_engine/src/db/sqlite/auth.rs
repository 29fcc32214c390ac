use std::str::FromStr;

use log::warn;
use sqlx::SqliteConnection;

use crate::{db::sqlite::SqliteDatabaseError, db_types::Role};

pub async fn fetch_roles_for_user(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Role>, SqliteDatabaseError> {
    let rows: Vec<String> = sqlx::query_scalar("SELECT role FROM roles WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    let roles = rows
        .into_iter()
        .filter_map(|r| {
            Role::from_str(&r)
                .map_err(|e| warn!("Ignoring unknown role in database: {e}"))
                .ok()
        })
        .collect();
    Ok(roles)
}

pub async fn assign_role(user_id: &str, role: Role, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    sqlx::query("INSERT INTO roles (user_id, role) VALUES (?, ?) ON CONFLICT (user_id, role) DO NOTHING")
        .bind(user_id)
        .bind(role.to_string())
        .execute(conn)
        .await?;
    Ok(())
}
