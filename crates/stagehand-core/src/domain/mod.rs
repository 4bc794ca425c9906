//! ドメインモデル（stage, options, experiment, status, errors）

pub mod errors;
pub mod experiment;
pub mod ids;
pub mod options;
pub mod scenario;
pub mod stage;
pub mod status;

pub use self::errors::{AppError, ApplyError};
pub use self::experiment::{Experiment, ExperimentMetadata, ExperimentSpec, Hardware, Interface, Node, Topology};
pub use self::ids::RunId;
pub use self::options::{InvocationOption, InvocationOptions};
pub use self::scenario::{HostMetadata, Scenario, ScenarioApp};
pub use self::stage::{ParseStageError, Stage};
pub use self::status::{AppStatus, Pass, StatusRecord};
