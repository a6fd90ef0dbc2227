//! Domain models and storage collaborators shared by the event signup services.

pub mod models;
pub mod store;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
