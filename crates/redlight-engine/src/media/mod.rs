pub mod cache;
pub mod event;
pub mod manifest;
pub mod sync;
