//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` (or a `PgExecutor` where the operation must also
//! run inside a transaction) as the first argument.

pub mod creator_repo;
pub mod presence_repo;
pub mod session_repo;

pub use creator_repo::CreatorRepo;
pub use presence_repo::PresenceRepo;
pub use session_repo::SessionRepo;
