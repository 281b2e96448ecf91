pub mod errors;
pub mod probe;
pub mod runner;
pub mod types;

pub use errors::ProcessError;
pub use probe::{ProcessProbe, SysinfoProbe};
pub use runner::ProcessRunner;
pub use types::{CommandOutput, Invocation};
