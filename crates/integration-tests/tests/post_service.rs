use domains::{DomainError, MaterializedPath, PostSort, ThreadRef};
use integration_tests::{reply, top, Fixture, FORUM, THREAD_SLUG};
use tokio_test::{assert_err, assert_ok};

async fn forum_posts(fx: &Fixture) -> i64 {
    use domains::ForumRegistry;
    fx.store.resolve_by_slug(FORUM).await.unwrap().posts
}

#[tokio::test]
async fn top_level_batch_gets_single_element_paths() {
    let fx = Fixture::seeded().await;

    let posts = fx
        .posts
        .create_posts(
            &ThreadRef::Slug(THREAD_SLUG.into()),
            vec![top("alice", "hi"), top("bob", "yo")],
        )
        .await
        .unwrap();

    assert_eq!(posts.len(), 2);
    assert!(posts[0].id < posts[1].id);
    assert!(posts[0].created <= posts[1].created);
    for post in &posts {
        assert_eq!(post.path, MaterializedPath::top_level(post.id));
        assert_eq!(post.root(), post.id);
        assert_eq!(post.parent, None);
        assert_eq!(post.forum, FORUM);
        assert_eq!(post.thread, fx.thread.id);
    }
    assert_eq!(forum_posts(&fx).await, 2);
}

#[tokio::test]
async fn reply_extends_parent_path() {
    let fx = Fixture::seeded().await;
    let ids = fx.post_batch(vec![top("alice", "hi"), top("bob", "yo")]).await;

    let posts = fx
        .posts
        .create_posts(&fx.thread_ref(), vec![reply(ids[0], "alice", "reply")])
        .await
        .unwrap();

    let child = &posts[0];
    assert_eq!(child.path.as_slice(), &[ids[0], child.id]);
    assert_eq!(child.root(), ids[0]);
    assert_eq!(forum_posts(&fx).await, 3);
}

#[tokio::test]
async fn chains_inside_one_batch_are_indexed_in_order() {
    let fx = Fixture::seeded().await;
    let ids = fx.post_batch(vec![top("alice", "root")]).await;

    let child_id = ids[0] + 1;
    let posts = fx
        .posts
        .create_posts(
            &fx.thread_ref(),
            vec![
                reply(ids[0], "bob", "child"),
                reply(child_id, "alice", "grandchild"),
            ],
        )
        .await
        .unwrap();

    assert_eq!(posts[0].id, child_id);
    assert_eq!(posts[1].path.as_slice(), &[ids[0], child_id, posts[1].id]);
    assert_eq!(posts[1].root(), ids[0]);
}

#[tokio::test]
async fn missing_parent_is_conflict_and_writes_nothing() {
    let fx = Fixture::seeded().await;
    fx.post_batch(vec![top("alice", "hi")]).await;

    let err = fx
        .posts
        .create_posts(
            &fx.thread_ref(),
            vec![top("bob", "fine"), reply(999, "alice", "x")],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Conflict(_)));
    assert_eq!(forum_posts(&fx).await, 1);
    let listed = assert_ok!(
        fx.posts
            .list_posts(&fx.thread_ref(), PostSort::Flat, Default::default())
            .await
    );
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn parent_from_another_thread_is_conflict() {
    let fx = Fixture::seeded().await;
    let ids = fx.post_batch(vec![top("alice", "hi")]).await;
    let other = fx
        .threads
        .create_thread(
            FORUM,
            domains::NewThread {
                slug: Some("other".into()),
                ..integration_tests::intro_thread()
            },
        )
        .await
        .unwrap();

    let err = fx
        .posts
        .create_posts(&ThreadRef::Id(other.id), vec![reply(ids[0], "bob", "stray")])
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)));
}

#[tokio::test]
async fn unknown_author_aborts_whole_batch() {
    let fx = Fixture::seeded().await;

    let err = fx
        .posts
        .create_posts(
            &fx.thread_ref(),
            vec![top("alice", "ok"), top("mallory", "nope")],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::NotFound(_)));
    assert_eq!(forum_posts(&fx).await, 0);
}

#[tokio::test]
async fn empty_batch_is_noop_but_thread_must_exist() {
    let fx = Fixture::seeded().await;

    let posts = assert_ok!(fx.posts.create_posts(&fx.thread_ref(), Vec::new()).await);
    assert!(posts.is_empty());
    assert_eq!(forum_posts(&fx).await, 0);

    let err = assert_err!(
        fx.posts
            .create_posts(&ThreadRef::Slug("nowhere".into()), Vec::new())
            .await
    );
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn author_spelling_is_canonicalized() {
    let fx = Fixture::seeded().await;

    let posts = fx
        .posts
        .create_posts(&fx.thread_ref(), vec![top("ALICE", "shouting")])
        .await
        .unwrap();
    assert_eq!(posts[0].author, "alice");
}

#[tokio::test]
async fn resubmitting_same_message_is_not_an_edit() {
    let fx = Fixture::seeded().await;
    let ids = fx.post_batch(vec![top("alice", "hi")]).await;

    let post = fx.posts.edit_post(ids[0], "hi").await.unwrap();
    assert!(!post.is_edited);
    assert_eq!(post.message, "hi");

    let post = fx.posts.edit_post(ids[0], "hello").await.unwrap();
    assert!(post.is_edited);
    assert_eq!(post.message, "hello");

    let post = fx.posts.edit_post(ids[0], "").await.unwrap();
    assert!(!post.is_edited);
    assert_eq!(post.message, "hello");

    let err = fx.posts.edit_post(4242, "x").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}
