pub mod document;
pub mod entity;
pub mod index;
pub mod job;

pub use document::*;
pub use entity::*;
pub use index::*;
pub use job::*;
