//! Profile directory methods on Repository (read only)

use super::Repository;
use crate::{
    error::AppResult,
    models::user::{ProfileRow, User},
};

impl Repository {
    /// All operator profiles
    pub async fn profiles_list(&self) -> AppResult<Vec<User>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, first_name, last_name, rank, role, email, matricule, caserne
            FROM profiles
            ORDER BY last_name, first_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }
}
