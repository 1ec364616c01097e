use deadpool_postgres::Pool;
use tokio_postgres::Row;

use crate::{
    error::{AppError, Result},
    models::user::AdminUser,
};

/// A helper function to map a `tokio_postgres::Row` to an `AdminUser`.
fn row_to_user(row: &Row) -> Result<AdminUser> {
    Ok(AdminUser {
        id: row.try_get("id").map_err(|_| AppError::MissingData("id".to_string()))?,
        email: row.try_get("email").map_err(|_| AppError::MissingData("email".to_string()))?,
        password_hash: row.try_get("password_hash").map_err(|_| AppError::MissingData("password_hash".to_string()))?,
        role: row.try_get("role").map_err(|_| AppError::MissingData("role".to_string()))?,
        is_active: row.try_get("is_active").map_err(|_| AppError::MissingData("is_active".to_string()))?,
    })
}

/// Finds an active admin user by email address.
pub async fn find_active_by_email(pool: &Pool, email: &str) -> Result<Option<AdminUser>> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            r#"
            SELECT id, email, password_hash, role, is_active
            FROM admin_users
            WHERE lower(email) = lower($1) AND is_active = true
            "#,
            &[&email],
        )
        .await?;
    row.map(|r| row_to_user(&r)).transpose()
}
