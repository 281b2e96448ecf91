pub mod errors;
pub mod store;

pub use errors::ScriptError;
pub use store::{ScriptFile, ScriptStore};
