//! Model definitions.

#[cfg(feature = "google")]
pub mod google;
