//! Thread lookup, creation and title/message edits.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    DomainError, DomainResult, ForumRegistry, NewThread, Thread, ThreadPatch, ThreadRef,
    ThreadRepository, UserDirectory,
};
use tracing::{debug, info, instrument, warn};

#[derive(Clone)]
pub struct ThreadService {
    threads: Arc<dyn ThreadRepository>,
    users: Arc<dyn UserDirectory>,
    forums: Arc<dyn ForumRegistry>,
}

impl ThreadService {
    pub fn new(
        threads: Arc<dyn ThreadRepository>,
        users: Arc<dyn UserDirectory>,
        forums: Arc<dyn ForumRegistry>,
    ) -> Self {
        Self {
            threads,
            users,
            forums,
        }
    }

    /// Looks a thread up by id or slug; `NotFound` when absent.
    #[instrument(skip(self), fields(thread = %thread))]
    pub async fn resolve(&self, thread: &ThreadRef) -> DomainResult<Thread> {
        debug!("resolving thread");
        self.threads
            .find_thread(thread)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("thread {thread}")))
    }

    /// Creates a thread in `forum` on behalf of `new.author`.
    #[instrument(skip(self, new), fields(author = %new.author))]
    pub async fn create_thread(&self, forum: &str, mut new: NewThread) -> DomainResult<Thread> {
        new.slug = new.slug.filter(|slug| !slug.is_empty());
        if let Some(slug) = &new.slug {
            if ThreadRef::parse(slug)? != ThreadRef::Slug(slug.clone()) {
                warn!(%slug, "rejecting numeric thread slug");
                return Err(DomainError::validation(format!(
                    "thread slug must not be numeric: {slug}"
                )));
            }
        }

        let author = self.users.resolve(&new.author).await?;
        let forum = self.forums.resolve_by_slug(forum).await?;

        if let Some(slug) = &new.slug {
            if let Some(existing) = self.threads.find_thread(&ThreadRef::Slug(slug.clone())).await? {
                return Err(DomainError::conflict(format!(
                    "thread slug {} already used by thread {}",
                    slug, existing.id
                )));
            }
        }

        new.author = author.nickname;
        new.forum = forum.slug;
        new.created.get_or_insert_with(Utc::now);

        let thread = self.threads.create_thread(new).await?;
        info!(thread_id = thread.id, forum = %thread.forum, "thread created");
        Ok(thread)
    }

    /// Replaces title and/or message; blank fields stay as they are.
    #[instrument(skip(self, patch), fields(thread = %thread))]
    pub async fn update_thread(&self, thread: &ThreadRef, patch: ThreadPatch) -> DomainResult<Thread> {
        let current = self.resolve(thread).await?;
        let patch = ThreadPatch {
            title: patch.title.filter(|t| !t.is_empty()),
            message: patch.message.filter(|m| !m.is_empty()),
        };
        if patch.title.is_none() && patch.message.is_none() {
            return Ok(current);
        }
        self.threads
            .update_thread(current.id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("thread {thread}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use domains::{ForumRef, Identity, MockForumRegistry, MockThreadRepository, MockUserDirectory};

    fn thread(id: i32, slug: Option<&str>) -> Thread {
        Thread {
            id,
            slug: slug.map(str::to_string),
            title: "Intro".into(),
            message: "Say hi".into(),
            author: "alice".into(),
            forum: "general".into(),
            created: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            votes: 0,
        }
    }

    fn new_thread(slug: Option<&str>) -> NewThread {
        NewThread {
            slug: slug.map(str::to_string),
            title: "Intro".into(),
            message: "Say hi".into(),
            author: "ALICE".into(),
            forum: String::new(),
            created: None,
        }
    }

    fn users_knowing_alice() -> MockUserDirectory {
        let mut users = MockUserDirectory::new();
        users.expect_resolve().returning(|nick| {
            if nick.eq_ignore_ascii_case("alice") {
                Ok(Identity { nickname: "alice".into() })
            } else {
                Err(DomainError::not_found(format!("user {nick}")))
            }
        });
        users
    }

    fn general_forum() -> MockForumRegistry {
        let mut forums = MockForumRegistry::new();
        forums.expect_resolve_by_slug().returning(|_| {
            Ok(ForumRef {
                slug: "general".into(),
                title: "General".into(),
                author: "alice".into(),
                posts: 0,
                threads: 0,
            })
        });
        forums
    }

    #[tokio::test]
    async fn resolve_missing_thread_is_not_found() {
        let mut threads = MockThreadRepository::new();
        threads.expect_find_thread().returning(|_| Ok(None));
        let service = ThreadService::new(
            Arc::new(threads),
            Arc::new(MockUserDirectory::new()),
            Arc::new(MockForumRegistry::new()),
        );

        let err = service.resolve(&ThreadRef::Id(7)).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_thread_stores_canonical_author_and_forum() {
        let mut threads = MockThreadRepository::new();
        threads.expect_find_thread().returning(|_| Ok(None));
        threads
            .expect_create_thread()
            .withf(|new| new.author == "alice" && new.forum == "general" && new.created.is_some())
            .times(1)
            .returning(|new| {
                let mut created = thread(1, new.slug.as_deref());
                created.author = new.author;
                Ok(created)
            });
        let service = ThreadService::new(
            Arc::new(threads),
            Arc::new(users_knowing_alice()),
            Arc::new(general_forum()),
        );

        let created = service
            .create_thread("GENERAL", new_thread(Some("intro")))
            .await
            .unwrap();
        assert_eq!(created.author, "alice");
        assert_eq!(created.slug.as_deref(), Some("intro"));
    }

    #[tokio::test]
    async fn create_thread_rejects_taken_slug() {
        let mut threads = MockThreadRepository::new();
        threads
            .expect_find_thread()
            .returning(|_| Ok(Some(thread(3, Some("intro")))));
        threads.expect_create_thread().never();
        let service = ThreadService::new(
            Arc::new(threads),
            Arc::new(users_knowing_alice()),
            Arc::new(general_forum()),
        );

        let err = service
            .create_thread("general", new_thread(Some("intro")))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn create_thread_rejects_numeric_slug() {
        let service = ThreadService::new(
            Arc::new(MockThreadRepository::new()),
            Arc::new(MockUserDirectory::new()),
            Arc::new(MockForumRegistry::new()),
        );

        let err = service
            .create_thread("general", new_thread(Some("123")))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn create_thread_with_unknown_author_is_not_found() {
        let mut threads = MockThreadRepository::new();
        threads.expect_create_thread().never();
        let service = ThreadService::new(
            Arc::new(threads),
            Arc::new(users_knowing_alice()),
            Arc::new(general_forum()),
        );
        let mut new = new_thread(None);
        new.author = "mallory".into();

        let err = service.create_thread("general", new).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn empty_patch_leaves_thread_untouched() {
        let mut threads = MockThreadRepository::new();
        threads
            .expect_find_thread()
            .returning(|_| Ok(Some(thread(1, None))));
        threads.expect_update_thread().never();
        let service = ThreadService::new(
            Arc::new(threads),
            Arc::new(MockUserDirectory::new()),
            Arc::new(MockForumRegistry::new()),
        );

        let patch = ThreadPatch {
            title: Some(String::new()),
            message: None,
        };
        let updated = service.update_thread(&ThreadRef::Id(1), patch).await.unwrap();
        assert_eq!(updated.title, "Intro");
    }
}
