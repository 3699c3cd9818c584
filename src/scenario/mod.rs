//! Scripted owner input: an initial tree plus a sequence of change events and
//! rename actions, loaded from a YAML file.

mod scenario;

pub use scenario::{Scenario, ScenarioError, Step, TreeEntry};
