pub mod discussion_service;

pub use discussion_service::DiscussionService;
