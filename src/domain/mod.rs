//! Domain logic - pure business rules independent of git operations

pub mod commit;
pub mod component;
pub mod tag;
pub mod version;

pub use commit::CommitMessage;
pub use component::{relative_git_path, Component};
pub use tag::ComponentTagPattern;
pub use version::{Version, VersionBump};
