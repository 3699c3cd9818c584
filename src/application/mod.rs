mod application;
mod replay;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub use replay::{Replay, ReplayReport};
pub use runtime_config::RuntimeConfig;
