//! HTTP Handlers

mod health;
mod posts;
mod users;

pub use health::*;
pub use posts::*;
pub use users::*;
