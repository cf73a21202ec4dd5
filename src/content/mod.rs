//! Content module - post models, normalization and derived fields

pub mod detail;
mod post;
pub mod reading;

pub use detail::{enumerate_identifiers, fetch_detail};
pub use post::{PostDetail, PostPage, PostSummary, Section};
