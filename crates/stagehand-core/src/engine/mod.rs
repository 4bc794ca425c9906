//! Engine - app の registry と、それを適用する orchestrator

pub mod cancel;
pub mod orchestrator;
pub mod registry;

pub use self::cancel::{CancelHandle, CancelToken, cancel_pair};
pub use self::orchestrator::Orchestrator;
pub use self::registry::{AppFactory, AppRegistry, BuildError, DEFAULT_COMMAND_PREFIX, RegistryBuilder};
