pub mod client;
pub mod paginator;

pub use client::{SearchParams, SerpApiClient};
pub use paginator::Paginator;
