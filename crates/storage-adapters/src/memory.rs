//! # MemoryStore
//!
//! In-process implementation of every port. All state sits behind one
//! `RwLock`, so each mutation is trivially atomic and readers only ever
//! observe committed batches. Used by the test suites and by the `memory`
//! storage backend for local development.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use domains::{
    resolve_edit, DomainError, DomainResult, ForumRef, ForumRegistry, Identity, Maintenance,
    NewForum, NewThread, PageQuery, PathIndexer, Post, PostDraft, PostId, PostRepository,
    PostSort, ServiceStatus, StatusReport, Thread, ThreadId, ThreadListQuery, ThreadPatch,
    ThreadRef, ThreadRepository, UserAccounts, UserDirectory, UserListQuery, UserPatch,
    UserProfile, VoteEvent, VoteId, VoteLedger, VoteValue,
};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct State {
    /// Keyed by lowercased nickname.
    users: HashMap<String, UserProfile>,
    /// Keyed by lowercased slug.
    forums: HashMap<String, ForumRef>,
    threads: BTreeMap<ThreadId, Thread>,
    posts: BTreeMap<PostId, Post>,
    votes: Vec<VoteEvent>,
    next_thread_id: ThreadId,
    next_post_id: PostId,
    next_vote_id: VoteId,
}

impl State {
    fn forum_mut(&mut self, slug: &str) -> DomainResult<&mut ForumRef> {
        self.forums
            .get_mut(&slug.to_lowercase())
            .ok_or_else(|| DomainError::not_found(format!("forum {slug}")))
    }

    fn email_taken(&self, email: &str, except: Option<&str>) -> bool {
        !email.is_empty()
            && self
                .users
                .iter()
                .any(|(key, u)| Some(key.as_str()) != except && u.email.eq_ignore_ascii_case(email))
    }

    fn insert_user(&mut self, profile: UserProfile) -> DomainResult<UserProfile> {
        let key = profile.nickname.to_lowercase();
        if self.users.contains_key(&key) || self.email_taken(&profile.email, None) {
            return Err(DomainError::conflict(format!(
                "user {} already exists",
                profile.nickname
            )));
        }
        self.users.insert(key, profile.clone());
        Ok(profile)
    }

    fn insert_forum(&mut self, new: NewForum) -> DomainResult<ForumRef> {
        let author = self
            .users
            .get(&new.author.to_lowercase())
            .map(|u| u.nickname.clone())
            .ok_or_else(|| DomainError::not_found(format!("user {}", new.author)))?;
        let key = new.slug.to_lowercase();
        if self.forums.contains_key(&key) {
            return Err(DomainError::conflict(format!("forum {} already exists", new.slug)));
        }
        let forum = ForumRef {
            slug: new.slug,
            title: new.title,
            author,
            posts: 0,
            threads: 0,
        };
        self.forums.insert(key, forum.clone());
        Ok(forum)
    }

    fn find_thread(&self, thread: &ThreadRef) -> Option<&Thread> {
        match thread {
            ThreadRef::Id(id) => self.threads.get(id),
            ThreadRef::Slug(slug) => self.threads.values().find(|t| {
                t.slug
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(slug))
            }),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user with a placeholder profile; the given spelling
    /// becomes canonical.
    pub async fn add_user(&self, nickname: &str) -> DomainResult<Identity> {
        let profile = UserProfile {
            nickname: nickname.to_string(),
            fullname: nickname.to_string(),
            about: String::new(),
            email: format!("{}@example.org", nickname.to_lowercase()),
        };
        let profile = self.state.write().await.insert_user(profile)?;
        Ok(profile.into())
    }

    /// Registers a forum with zeroed counters.
    pub async fn add_forum(&self, slug: &str, title: &str, author: &str) -> DomainResult<ForumRef> {
        self.state.write().await.insert_forum(NewForum {
            slug: slug.to_string(),
            title: title.to_string(),
            author: author.to_string(),
        })
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn resolve(&self, nickname: &str) -> DomainResult<Identity> {
        self.state
            .read()
            .await
            .users
            .get(&nickname.to_lowercase())
            .map(|u| Identity {
                nickname: u.nickname.clone(),
            })
            .ok_or_else(|| DomainError::not_found(format!("user {nickname}")))
    }
}

#[async_trait]
impl UserAccounts for MemoryStore {
    async fn create_user(&self, profile: UserProfile) -> DomainResult<UserProfile> {
        self.state.write().await.insert_user(profile)
    }

    async fn find_user(&self, nickname: &str) -> DomainResult<Option<UserProfile>> {
        Ok(self.state.read().await.users.get(&nickname.to_lowercase()).cloned())
    }

    async fn update_user(&self, nickname: &str, patch: UserPatch) -> DomainResult<Option<UserProfile>> {
        let mut state = self.state.write().await;
        let key = nickname.to_lowercase();
        if !state.users.contains_key(&key) {
            return Ok(None);
        }
        if let Some(email) = &patch.email {
            if state.email_taken(email, Some(key.as_str())) {
                return Err(DomainError::conflict(format!("email {email} is taken")));
            }
        }
        let Some(user) = state.users.get_mut(&key) else {
            return Ok(None);
        };
        if let Some(fullname) = patch.fullname {
            user.fullname = fullname;
        }
        if let Some(about) = patch.about {
            user.about = about;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        Ok(Some(user.clone()))
    }

    async fn forum_users(&self, forum: &str, query: UserListQuery) -> DomainResult<Vec<UserProfile>> {
        let state = self.state.read().await;
        let authors: BTreeSet<String> = state
            .threads
            .values()
            .filter(|t| t.forum == forum)
            .map(|t| t.author.to_lowercase())
            .chain(
                state
                    .posts
                    .values()
                    .filter(|p| p.forum == forum)
                    .map(|p| p.author.to_lowercase()),
            )
            .collect();
        let since = query.since.as_deref().map(str::to_lowercase);

        // BTreeSet iteration is already ascending by lowercased nickname.
        let mut keys: Vec<&String> = authors
            .iter()
            .filter(|key| match &since {
                Some(since) if query.desc => key.as_str() < since.as_str(),
                Some(since) => key.as_str() > since.as_str(),
                None => true,
            })
            .collect();
        if query.desc {
            keys.reverse();
        }
        if let Some(limit) = query.limit {
            keys.truncate(limit as usize);
        }
        Ok(keys
            .into_iter()
            .filter_map(|key| state.users.get(key).cloned())
            .collect())
    }
}

#[async_trait]
impl ForumRegistry for MemoryStore {
    async fn create_forum(&self, forum: NewForum) -> DomainResult<ForumRef> {
        self.state.write().await.insert_forum(forum)
    }

    async fn resolve_by_slug(&self, slug: &str) -> DomainResult<ForumRef> {
        self.state
            .read()
            .await
            .forums
            .get(&slug.to_lowercase())
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("forum {slug}")))
    }

    async fn increment_post_count(&self, forum: &str, delta: i64) -> DomainResult<()> {
        self.state.write().await.forum_mut(forum)?.posts += delta;
        Ok(())
    }

    async fn increment_thread_count(&self, forum: &str) -> DomainResult<()> {
        self.state.write().await.forum_mut(forum)?.threads += 1;
        Ok(())
    }
}

#[async_trait]
impl ThreadRepository for MemoryStore {
    async fn create_thread(&self, new: NewThread) -> DomainResult<Thread> {
        let mut state = self.state.write().await;
        if let Some(slug) = &new.slug {
            if state.find_thread(&ThreadRef::Slug(slug.clone())).is_some() {
                return Err(DomainError::conflict(format!("thread slug {slug} already exists")));
            }
        }
        let forum = state.forum_mut(&new.forum)?;
        forum.threads += 1;
        let forum = forum.slug.clone();

        state.next_thread_id += 1;
        let thread = Thread {
            id: state.next_thread_id,
            slug: new.slug,
            title: new.title,
            message: new.message,
            author: new.author,
            forum,
            created: new.created.unwrap_or_else(Utc::now),
            votes: 0,
        };
        state.threads.insert(thread.id, thread.clone());
        Ok(thread)
    }

    async fn find_thread(&self, thread: &ThreadRef) -> DomainResult<Option<Thread>> {
        Ok(self.state.read().await.find_thread(thread).cloned())
    }

    async fn update_thread(&self, id: ThreadId, patch: ThreadPatch) -> DomainResult<Option<Thread>> {
        let mut state = self.state.write().await;
        let Some(thread) = state.threads.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = patch.title.filter(|t| !t.is_empty()) {
            thread.title = title;
        }
        if let Some(message) = patch.message.filter(|m| !m.is_empty()) {
            thread.message = message;
        }
        Ok(Some(thread.clone()))
    }

    async fn list_forum_threads(&self, forum: &str, query: ThreadListQuery) -> DomainResult<Vec<Thread>> {
        let state = self.state.read().await;
        let mut threads: Vec<&Thread> = state
            .threads
            .values()
            .filter(|t| t.forum == forum)
            .filter(|t| match query.since {
                Some(since) if query.desc => t.created <= since,
                Some(since) => t.created >= since,
                None => true,
            })
            .collect();
        threads.sort_by_key(|t| (t.created, t.id));
        if query.desc {
            threads.reverse();
        }
        if let Some(limit) = query.limit {
            threads.truncate(limit as usize);
        }
        Ok(threads.into_iter().cloned().collect())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_posts(&self, thread: &Thread, drafts: Vec<PostDraft>) -> DomainResult<Vec<Post>> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }
        let mut state = self.state.write().await;

        let first_id = state.next_post_id + 1;
        let batch_ids = first_id..first_id + drafts.len() as PostId;

        // Parents assigned earlier in this batch are left to the indexer.
        let stored_parents: BTreeSet<PostId> = drafts
            .iter()
            .filter_map(|d| d.parent)
            .filter(|id| !batch_ids.contains(id))
            .collect();
        let mut parent_paths = Vec::with_capacity(stored_parents.len());
        for parent_id in stored_parents {
            match state.posts.get(&parent_id) {
                Some(parent) if parent.thread == thread.id => parent_paths.push(parent.path.clone()),
                _ => {
                    return Err(DomainError::conflict(format!(
                        "parent post {parent_id} is not in thread {}",
                        thread.id
                    )))
                }
            }
        }
        // Validate the forum before touching ids so a failure leaves no trace.
        state.forum_mut(&thread.forum)?;

        let mut indexer = PathIndexer::with_parents(parent_paths);
        let created = Utc::now();
        let mut posts = Vec::with_capacity(drafts.len());
        for (draft, id) in drafts.into_iter().zip(batch_ids) {
            let path = indexer.index(id, draft.parent)?;
            posts.push(Post {
                id,
                parent: draft.parent,
                author: draft.author,
                message: draft.message,
                forum: thread.forum.clone(),
                thread: thread.id,
                created,
                is_edited: false,
                path,
            });
        }

        state.next_post_id += posts.len() as PostId;
        for post in &posts {
            state.posts.insert(post.id, post.clone());
        }
        state.forum_mut(&thread.forum)?.posts += posts.len() as i64;
        debug!(thread_id = thread.id, count = posts.len(), "memory batch stored");
        Ok(posts)
    }

    async fn find_post(&self, id: PostId) -> DomainResult<Option<Post>> {
        Ok(self.state.read().await.posts.get(&id).cloned())
    }

    async fn list_posts(&self, thread: ThreadId, sort: PostSort, page: PageQuery) -> DomainResult<Vec<Post>> {
        let state = self.state.read().await;
        let posts: Vec<&Post> = state.posts.values().filter(|p| p.thread == thread).collect();
        let cursor = match page.since {
            Some(since) => match posts.iter().find(|p| p.id == since) {
                Some(cursor) => Some(*cursor),
                // A cursor outside this thread matches nothing.
                None => return Ok(Vec::new()),
            },
            None => None,
        };

        let listed = match sort {
            PostSort::Flat => ordered_page(posts, cursor, page, |p| (p.created, p.id)),
            PostSort::Tree => ordered_page(posts, cursor, page, |p| p.path.clone()),
            PostSort::ParentTree => parent_tree_page(posts, cursor, page),
        };
        Ok(listed.into_iter().cloned().collect())
    }

    async fn edit_message(&self, id: PostId, candidate: &str) -> DomainResult<Option<Post>> {
        let mut state = self.state.write().await;
        let Some(post) = state.posts.get_mut(&id) else {
            return Ok(None);
        };
        let outcome = resolve_edit(&post.message, candidate);
        let (message, is_edited) = (outcome.message.to_string(), outcome.is_edited);
        post.message = message;
        post.is_edited = is_edited;
        Ok(Some(post.clone()))
    }
}

/// Sorts by `key`, keeps entries strictly past the cursor in the chosen
/// direction and applies the limit.
fn ordered_page<'a, K, F>(mut posts: Vec<&'a Post>, cursor: Option<&Post>, page: PageQuery, key: F) -> Vec<&'a Post>
where
    K: Ord,
    F: Fn(&Post) -> K,
{
    if let Some(cursor) = cursor {
        let bound = key(cursor);
        posts.retain(|p| if page.desc { key(p) < bound } else { key(p) > bound });
    }
    posts.sort_by_key(|p| key(p));
    if page.desc {
        posts.reverse();
    }
    if let Some(limit) = page.limit {
        posts.truncate(limit as usize);
    }
    posts
}

/// Pages over top-level posts, then returns every post of the selected
/// subtrees ordered by root (in the page direction) and path.
fn parent_tree_page<'a>(posts: Vec<&'a Post>, cursor: Option<&Post>, page: PageQuery) -> Vec<&'a Post> {
    let tops: Vec<&Post> = posts.iter().copied().filter(|p| p.is_top_level()).collect();
    let cursor_root = cursor.map(Post::root);
    let mut tops: Vec<PostId> = tops
        .into_iter()
        .map(|p| p.id)
        .filter(|id| match cursor_root {
            Some(root) if page.desc => *id < root,
            Some(root) => *id > root,
            None => true,
        })
        .collect();
    tops.sort_unstable();
    if page.desc {
        tops.reverse();
    }
    if let Some(limit) = page.limit {
        tops.truncate(limit as usize);
    }

    let selected: BTreeSet<PostId> = tops.iter().copied().collect();
    let mut subtree: Vec<&Post> = posts
        .into_iter()
        .filter(|p| selected.contains(&p.root()))
        .collect();
    subtree.sort_by(|a, b| {
        let by_root = if page.desc {
            b.root().cmp(&a.root())
        } else {
            a.root().cmp(&b.root())
        };
        by_root.then_with(|| a.path.cmp(&b.path))
    });
    subtree
}

#[async_trait]
impl VoteLedger for MemoryStore {
    async fn cast_vote(&self, thread: ThreadId, nickname: &str, value: VoteValue) -> DomainResult<i32> {
        let mut state = self.state.write().await;
        if !state.threads.contains_key(&thread) {
            return Err(DomainError::not_found(format!("thread {thread}")));
        }
        let previous = state
            .votes
            .iter()
            .rev()
            .find(|v| v.thread_id == thread && v.nickname == nickname)
            .map(|v| (v.id, v.value.as_i32()));
        let (previous_vote_id, previous_value) = match previous {
            Some((id, value)) => (Some(id), value),
            None => (None, 0),
        };

        state.next_vote_id += 1;
        let event = VoteEvent {
            id: state.next_vote_id,
            nickname: nickname.to_string(),
            value,
            thread_id: thread,
            previous_vote_id,
        };
        state.votes.push(event);

        let thread = state
            .threads
            .get_mut(&thread)
            .ok_or_else(|| DomainError::not_found(format!("thread {thread}")))?;
        thread.votes += value.as_i32() - previous_value;
        Ok(thread.votes)
    }

    async fn vote_history(&self, thread: ThreadId) -> DomainResult<Vec<VoteEvent>> {
        Ok(self
            .state
            .read()
            .await
            .votes
            .iter()
            .filter(|v| v.thread_id == thread)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StatusReport for MemoryStore {
    async fn status(&self) -> DomainResult<ServiceStatus> {
        let state = self.state.read().await;
        Ok(ServiceStatus {
            users: state.users.len() as i64,
            forums: state.forums.len() as i64,
            threads: state.threads.len() as i64,
            posts: state.posts.len() as i64,
        })
    }
}

#[async_trait]
impl Maintenance for MemoryStore {
    async fn clear(&self) -> DomainResult<()> {
        *self.state.write().await = State::default();
        debug!("memory store cleared");
        Ok(())
    }
}
