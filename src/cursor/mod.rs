pub mod cursor_store;

pub use cursor_store::{CursorFile, CursorStore};
