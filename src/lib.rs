//! weathergate: a rate-limited, cache-aside weather lookup service.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod state;
