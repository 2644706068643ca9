//! # PostService
//!
//! Bulk post creation, the three traversal orders, post details and the
//! message edit path.

use std::collections::HashMap;
use std::sync::Arc;

use domains::{
    DomainError, DomainResult, ForumRegistry, PageQuery, Post, PostDetails, PostDraft, PostId,
    PostRelated, PostRepository, PostSort, ThreadRef, ThreadRepository, UserDirectory,
};
use tracing::{debug, info, instrument};

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    threads: Arc<dyn ThreadRepository>,
    users: Arc<dyn UserDirectory>,
    forums: Arc<dyn ForumRegistry>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        threads: Arc<dyn ThreadRepository>,
        users: Arc<dyn UserDirectory>,
        forums: Arc<dyn ForumRegistry>,
    ) -> Self {
        Self {
            posts,
            threads,
            users,
            forums,
        }
    }

    /// Creates `drafts` under `thread` as one all-or-nothing batch.
    ///
    /// Fails with `NotFound` for an unknown thread or author and with
    /// `Conflict` when a parent is missing or belongs to another thread.
    /// An empty batch writes nothing.
    #[instrument(skip(self, drafts), fields(thread = %thread, batch = drafts.len()))]
    pub async fn create_posts(&self, thread: &ThreadRef, mut drafts: Vec<PostDraft>) -> DomainResult<Vec<Post>> {
        let thread = self
            .threads
            .find_thread(thread)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("thread {thread}")))?;

        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        // Each distinct nickname hits the directory once.
        let mut canonical: HashMap<String, String> = HashMap::new();
        for draft in &drafts {
            if !canonical.contains_key(&draft.author) {
                let identity = self.users.resolve(&draft.author).await?;
                canonical.insert(draft.author.clone(), identity.nickname);
            }
        }
        for draft in &mut drafts {
            if let Some(nickname) = canonical.get(&draft.author) {
                draft.author.clone_from(nickname);
            }
        }

        let posts = self.posts.create_posts(&thread, drafts).await?;
        info!(thread_id = thread.id, created = posts.len(), "post batch committed");
        Ok(posts)
    }

    /// Lists a thread's posts in the requested order.
    #[instrument(skip(self), fields(thread = %thread))]
    pub async fn list_posts(&self, thread: &ThreadRef, sort: PostSort, page: PageQuery) -> DomainResult<Vec<Post>> {
        let thread = self
            .threads
            .find_thread(thread)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("thread {thread}")))?;
        let posts = self.posts.list_posts(thread.id, sort, page).await?;
        debug!(returned = posts.len(), "posts listed");
        Ok(posts)
    }

    #[instrument(skip(self))]
    pub async fn get_post(&self, id: PostId) -> DomainResult<Post> {
        self.posts
            .find_post(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("post {id}")))
    }

    /// A post plus whichever of author, forum and thread were requested.
    #[instrument(skip(self))]
    pub async fn post_details(&self, id: PostId, related: PostRelated) -> DomainResult<PostDetails> {
        let post = self.get_post(id).await?;

        let author = if related.user {
            Some(self.users.resolve(&post.author).await?)
        } else {
            None
        };
        let forum = if related.forum {
            Some(self.forums.resolve_by_slug(&post.forum).await?)
        } else {
            None
        };
        let thread = if related.thread {
            let thread = self
                .threads
                .find_thread(&ThreadRef::Id(post.thread))
                .await?
                .ok_or_else(|| DomainError::not_found(format!("thread {}", post.thread)))?;
            Some(thread)
        } else {
            None
        };

        Ok(PostDetails {
            post,
            author,
            forum,
            thread,
        })
    }

    /// Edits a post's message; see [`domains::resolve_edit`] for the rules.
    #[instrument(skip(self, message))]
    pub async fn edit_post(&self, id: PostId, message: &str) -> DomainResult<Post> {
        let post = self
            .posts
            .edit_message(id, message)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("post {id}")))?;
        debug!(is_edited = post.is_edited, "post edit applied");
        Ok(post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use domains::{
        Identity, MaterializedPath, MockForumRegistry, MockPostRepository, MockThreadRepository,
        MockUserDirectory, Thread,
    };

    fn intro() -> Thread {
        Thread {
            id: 1,
            slug: Some("intro".into()),
            title: "Intro".into(),
            message: "Say hi".into(),
            author: "alice".into(),
            forum: "general".into(),
            created: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            votes: 0,
        }
    }

    fn post(id: PostId, message: &str, is_edited: bool) -> Post {
        Post {
            id,
            parent: None,
            author: "alice".into(),
            message: message.into(),
            forum: "general".into(),
            thread: 1,
            created: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            is_edited,
            path: MaterializedPath::top_level(id),
        }
    }

    fn threads_with_intro() -> MockThreadRepository {
        let mut threads = MockThreadRepository::new();
        threads.expect_find_thread().returning(|thread| match thread {
            ThreadRef::Id(1) => Ok(Some(intro())),
            ThreadRef::Slug(slug) if slug == "intro" => Ok(Some(intro())),
            _ => Ok(None),
        });
        threads
    }

    fn directory() -> MockUserDirectory {
        let mut users = MockUserDirectory::new();
        users.expect_resolve().returning(|nick| match nick.to_lowercase().as_str() {
            "alice" => Ok(Identity { nickname: "alice".into() }),
            "bob" => Ok(Identity { nickname: "Bob".into() }),
            _ => Err(DomainError::not_found(format!("user {nick}"))),
        });
        users
    }

    fn service(posts: MockPostRepository, users: MockUserDirectory) -> PostService {
        PostService::new(
            Arc::new(posts),
            Arc::new(threads_with_intro()),
            Arc::new(users),
            Arc::new(MockForumRegistry::new()),
        )
    }

    #[tokio::test]
    async fn empty_batch_writes_nothing() {
        let mut posts = MockPostRepository::new();
        posts.expect_create_posts().never();
        let service = service(posts, MockUserDirectory::new());

        let created = service
            .create_posts(&ThreadRef::Slug("intro".into()), Vec::new())
            .await
            .unwrap();
        assert!(created.is_empty());
    }

    #[tokio::test]
    async fn unknown_thread_is_not_found() {
        let mut posts = MockPostRepository::new();
        posts.expect_create_posts().never();
        let service = service(posts, directory());

        let err = service
            .create_posts(&ThreadRef::Id(9), vec![PostDraft::new(None, "alice", "hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn unknown_author_aborts_batch_before_any_write() {
        let mut posts = MockPostRepository::new();
        posts.expect_create_posts().never();
        let service = service(posts, directory());

        let drafts = vec![
            PostDraft::new(None, "alice", "hi"),
            PostDraft::new(None, "ghost", "boo"),
        ];
        let err = service
            .create_posts(&ThreadRef::Id(1), drafts)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn authors_are_canonicalised_and_resolved_once() {
        let mut users = MockUserDirectory::new();
        users
            .expect_resolve()
            .times(1)
            .returning(|_| Ok(Identity { nickname: "Bob".into() }));
        let mut posts = MockPostRepository::new();
        posts
            .expect_create_posts()
            .withf(|thread, drafts| {
                thread.id == 1 && drafts.len() == 2 && drafts.iter().all(|d| d.author == "Bob")
            })
            .times(1)
            .returning(|_, drafts| {
                Ok(drafts
                    .into_iter()
                    .enumerate()
                    .map(|(i, d)| post(10 + i as PostId, &d.message, false))
                    .collect())
            });
        let service = service(posts, users);

        let drafts = vec![
            PostDraft::new(None, "bob", "yo"),
            PostDraft::new(None, "bob", "again"),
        ];
        let created = service.create_posts(&ThreadRef::Id(1), drafts).await.unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(created[0].id, 10);
    }

    #[tokio::test]
    async fn parent_conflict_from_repository_propagates() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_create_posts()
            .returning(|_, _| Err(DomainError::conflict("parent post 999 is not in this thread")));
        let service = service(posts, directory());

        let err = service
            .create_posts(&ThreadRef::Id(1), vec![PostDraft::new(Some(999), "alice", "x")])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn listing_resolves_slug_to_id() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_list_posts()
            .withf(|thread, sort, page| *thread == 1 && *sort == PostSort::Tree && page.desc)
            .returning(|_, _, _| Ok(vec![post(10, "hi", false)]));
        let service = service(posts, MockUserDirectory::new());

        let listed = service
            .list_posts(&ThreadRef::Slug("intro".into()), PostSort::Tree, PageQuery::descending())
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn editing_missing_post_is_not_found() {
        let mut posts = MockPostRepository::new();
        posts.expect_edit_message().returning(|_, _| Ok(None));
        let service = service(posts, MockUserDirectory::new());

        let err = service.edit_post(404, "new").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn details_attach_requested_relations_only() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_find_post()
            .returning(|id| Ok(Some(post(id, "hi", false))));
        let service = service(posts, directory());

        let related = PostRelated {
            user: true,
            forum: false,
            thread: true,
        };
        let details = service.post_details(10, related).await.unwrap();
        assert_eq!(details.author.unwrap().nickname, "alice");
        assert_eq!(details.thread.unwrap().id, 1);
        assert!(details.forum.is_none());
    }
}
