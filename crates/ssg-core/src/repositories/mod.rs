//! Repository traits (ports)

pub mod post_repository;
pub mod session_repository;
pub mod user_repository;

pub use post_repository::PostRepository;
pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use post_repository::MockPostRepository;
#[cfg(test)]
pub use session_repository::MockSessionRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
