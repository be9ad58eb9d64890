pub mod token_manager;

pub use token_manager::{bearer_header, TokenManager};
