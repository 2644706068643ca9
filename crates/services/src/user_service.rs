//! User account creation and profile edits.

use std::sync::Arc;

use domains::{DomainError, DomainResult, UserAccounts, UserPatch, UserProfile};
use tracing::{info, instrument};

#[derive(Clone)]
pub struct UserService {
    accounts: Arc<dyn UserAccounts>,
}

impl UserService {
    pub fn new(accounts: Arc<dyn UserAccounts>) -> Self {
        Self { accounts }
    }

    /// Registers a new account. Nickname and email are required.
    #[instrument(skip(self, profile), fields(nickname = %profile.nickname))]
    pub async fn create_user(&self, profile: UserProfile) -> DomainResult<UserProfile> {
        if profile.nickname.trim().is_empty() {
            return Err(DomainError::validation("nickname is required"));
        }
        if profile.email.trim().is_empty() {
            return Err(DomainError::validation("email is required"));
        }
        let created = self.accounts.create_user(profile).await?;
        info!(nickname = %created.nickname, "user created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn profile(&self, nickname: &str) -> DomainResult<UserProfile> {
        self.accounts
            .find_user(nickname)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("user {nickname}")))
    }

    /// Applies the non-blank fields of `patch`.
    #[instrument(skip(self, patch))]
    pub async fn update_profile(&self, nickname: &str, patch: UserPatch) -> DomainResult<UserProfile> {
        let patch = patch.non_blank();
        if patch.is_empty() {
            return self.profile(nickname).await;
        }
        self.accounts
            .update_user(nickname, patch)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("user {nickname}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::MockUserAccounts;

    fn alice() -> UserProfile {
        UserProfile {
            nickname: "alice".into(),
            fullname: "Alice A.".into(),
            about: String::new(),
            email: "alice@example.org".into(),
        }
    }

    #[tokio::test]
    async fn missing_email_is_rejected_before_storage() {
        let mut accounts = MockUserAccounts::new();
        accounts.expect_create_user().never();
        let service = UserService::new(Arc::new(accounts));

        let err = service
            .create_user(UserProfile {
                email: " ".into(),
                ..alice()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn blank_update_returns_current_profile() {
        let mut accounts = MockUserAccounts::new();
        accounts.expect_update_user().never();
        accounts.expect_find_user().returning(|_| Ok(Some(alice())));
        let service = UserService::new(Arc::new(accounts));

        let profile = service
            .update_profile(
                "ALICE",
                UserPatch {
                    fullname: Some(String::new()),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile, alice());
    }

    #[tokio::test]
    async fn update_of_unknown_user_is_not_found() {
        let mut accounts = MockUserAccounts::new();
        accounts.expect_update_user().returning(|_, _| Ok(None));
        let service = UserService::new(Arc::new(accounts));

        let err = service
            .update_profile(
                "ghost",
                UserPatch {
                    about: Some("boo".into()),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
