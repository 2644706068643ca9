//! # services
//!
//! Application services. Each service owns `Arc`s of the ports it needs;
//! validation and existence checks happen here, before any write reaches
//! a repository.

pub mod forum_service;
pub mod post_service;
pub mod thread_service;
pub mod user_service;
pub mod vote_service;

pub use forum_service::ForumService;
pub use post_service::PostService;
pub use thread_service::ThreadService;
pub use user_service::UserService;
pub use vote_service::VoteService;
