//! Operator directory (read only)

use uuid::Uuid;

use super::snapshot::SnapshotHandle;
use crate::{
    error::{AppError, AppResult},
    models::{normalize_text, user::{User, UserClaims}},
};

#[derive(Clone)]
pub struct DirectoryService {
    snapshot: SnapshotHandle,
}

impl DirectoryService {
    pub fn new(snapshot: SnapshotHandle) -> Self {
        Self { snapshot }
    }

    /// All operators, alphabetical
    pub async fn list(&self) -> Vec<User> {
        let mut users = self.snapshot.read().await.users.clone();
        users.sort_by_cached_key(|u| normalize_text(&u.name));
        users
    }

    pub async fn get(&self, id: Uuid) -> AppResult<User> {
        self.snapshot
            .read()
            .await
            .user(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Operator {} not found", id)))
    }

    /// Resolve the session subject to an operator profile.
    /// A miss reloads the directory once: the profile may have been created since the last sync.
    pub async fn current_user(&self, claims: &UserClaims) -> AppResult<User> {
        if let Some(user) = self.snapshot.read().await.user(claims.sub).cloned() {
            return Ok(user);
        }

        self.snapshot.refresh_users().await?;

        self.snapshot
            .read()
            .await
            .user(claims.sub)
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("Session {} has no operator profile", claims.sub);
                AppError::Authentication("No operator profile for this account".to_string())
            })
    }

    pub async fn refresh(&self) -> AppResult<()> {
        self.snapshot.refresh_users().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Role;
    use crate::repository::MemoryStore;
    use std::sync::Arc;

    fn operator(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            rank: "Sapeur".to_string(),
            role: Role::Operator,
            email: None,
            matricule: None,
            caserne: None,
        }
    }

    fn claims(sub: Uuid) -> UserClaims {
        UserClaims {
            sub,
            email: None,
            exp: 0,
            iat: None,
        }
    }

    #[tokio::test]
    async fn test_list_is_alphabetical() {
        let store = Arc::new(MemoryStore::with_profiles(vec![
            operator("MARTIN Paul"),
            operator("ÉLIE Marc"),
            operator("DUPONT Jean"),
        ]));
        let snapshot = SnapshotHandle::new(store);
        snapshot.refresh().await.unwrap();

        let names: Vec<String> = DirectoryService::new(snapshot)
            .list()
            .await
            .into_iter()
            .map(|u| u.name)
            .collect();
        assert_eq!(names, vec!["DUPONT Jean", "ÉLIE Marc", "MARTIN Paul"]);
    }

    #[tokio::test]
    async fn test_current_user_picks_up_new_profiles() {
        let store = Arc::new(MemoryStore::new());
        let snapshot = SnapshotHandle::new(store.clone());
        snapshot.refresh().await.unwrap();
        let directory = DirectoryService::new(snapshot);

        let newcomer = operator("LEROY Lucas");
        assert!(matches!(
            directory.current_user(&claims(newcomer.id)).await,
            Err(AppError::Authentication(_))
        ));

        store.put_profile(newcomer.clone()).await;
        let user = directory.current_user(&claims(newcomer.id)).await.unwrap();
        assert_eq!(user, newcomer);
    }
}
