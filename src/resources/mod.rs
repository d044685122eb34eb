//! Filesystem primitives: links, moves and the git exclude block.
pub mod exclude;
pub mod fs;
pub mod link;

pub use exclude::ExcludeFile;
pub use link::{LinkResource, LinkState, create_link};
