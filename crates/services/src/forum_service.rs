//! Forum creation, details and the per-forum thread and user listings.

use std::sync::Arc;

use domains::{
    DomainError, DomainResult, ForumRef, ForumRegistry, NewForum, Thread, ThreadListQuery,
    ThreadRepository, UserAccounts, UserDirectory, UserListQuery, UserProfile,
};
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct ForumService {
    forums: Arc<dyn ForumRegistry>,
    users: Arc<dyn UserDirectory>,
    threads: Arc<dyn ThreadRepository>,
    accounts: Arc<dyn UserAccounts>,
}

impl ForumService {
    pub fn new(
        forums: Arc<dyn ForumRegistry>,
        users: Arc<dyn UserDirectory>,
        threads: Arc<dyn ThreadRepository>,
        accounts: Arc<dyn UserAccounts>,
    ) -> Self {
        Self {
            forums,
            users,
            threads,
            accounts,
        }
    }

    /// Creates a forum owned by `new.author` (resolved to its canonical spelling).
    #[instrument(skip(self, new), fields(slug = %new.slug))]
    pub async fn create_forum(&self, mut new: NewForum) -> DomainResult<ForumRef> {
        if new.slug.trim().is_empty() {
            return Err(DomainError::validation("forum slug is required"));
        }
        new.author = self.users.resolve(&new.author).await?.nickname;
        let forum = self.forums.create_forum(new).await?;
        info!(slug = %forum.slug, "forum created");
        Ok(forum)
    }

    #[instrument(skip(self))]
    pub async fn details(&self, slug: &str) -> DomainResult<ForumRef> {
        self.forums.resolve_by_slug(slug).await
    }

    #[instrument(skip(self))]
    pub async fn threads(&self, slug: &str, query: ThreadListQuery) -> DomainResult<Vec<Thread>> {
        let forum = self.forums.resolve_by_slug(slug).await?;
        let threads = self.threads.list_forum_threads(&forum.slug, query).await?;
        debug!(returned = threads.len(), "forum threads listed");
        Ok(threads)
    }

    #[instrument(skip(self))]
    pub async fn users(&self, slug: &str, query: UserListQuery) -> DomainResult<Vec<UserProfile>> {
        let forum = self.forums.resolve_by_slug(slug).await?;
        let users = self.accounts.forum_users(&forum.slug, query).await?;
        debug!(returned = users.len(), "forum users listed");
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::{
        Identity, MockForumRegistry, MockThreadRepository, MockUserAccounts, MockUserDirectory,
    };

    fn general() -> ForumRef {
        ForumRef {
            slug: "general".into(),
            title: "General".into(),
            author: "alice".into(),
            posts: 0,
            threads: 0,
        }
    }

    fn service(forums: MockForumRegistry, users: MockUserDirectory, threads: MockThreadRepository) -> ForumService {
        ForumService::new(
            Arc::new(forums),
            Arc::new(users),
            Arc::new(threads),
            Arc::new(MockUserAccounts::new()),
        )
    }

    #[tokio::test]
    async fn create_forum_uses_canonical_author() {
        let mut users = MockUserDirectory::new();
        users
            .expect_resolve()
            .returning(|_| Ok(Identity { nickname: "alice".into() }));
        let mut forums = MockForumRegistry::new();
        forums
            .expect_create_forum()
            .withf(|new| new.author == "alice")
            .times(1)
            .returning(|_| Ok(general()));

        let forum = service(forums, users, MockThreadRepository::new())
            .create_forum(NewForum {
                slug: "general".into(),
                title: "General".into(),
                author: "ALICE".into(),
            })
            .await
            .unwrap();
        assert_eq!(forum.author, "alice");
    }

    #[tokio::test]
    async fn create_forum_with_unknown_author_is_not_found() {
        let mut users = MockUserDirectory::new();
        users
            .expect_resolve()
            .returning(|nick| Err(DomainError::not_found(format!("user {nick}"))));
        let mut forums = MockForumRegistry::new();
        forums.expect_create_forum().never();

        let err = service(forums, users, MockThreadRepository::new())
            .create_forum(NewForum {
                slug: "general".into(),
                title: "General".into(),
                author: "ghost".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn thread_listing_uses_canonical_slug() {
        let mut forums = MockForumRegistry::new();
        forums.expect_resolve_by_slug().returning(|_| Ok(general()));
        let mut threads = MockThreadRepository::new();
        threads
            .expect_list_forum_threads()
            .withf(|forum, _| forum == "general")
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let listed = service(forums, MockUserDirectory::new(), threads)
            .threads("GENERAL", ThreadListQuery::default())
            .await
            .unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn listing_unknown_forum_is_not_found() {
        let mut forums = MockForumRegistry::new();
        forums
            .expect_resolve_by_slug()
            .returning(|slug| Err(DomainError::not_found(format!("forum {slug}"))));
        let mut threads = MockThreadRepository::new();
        threads.expect_list_forum_threads().never();

        let err = service(forums, MockUserDirectory::new(), threads)
            .threads("nowhere", ThreadListQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
