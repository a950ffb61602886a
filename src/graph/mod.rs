//! Graph snapshots, validation and live node instances.
//!
//! [`GraphData`] is the engine-independent snapshot the text codec reads and
//! writes. [`validate_graph`] checks it against the registry's port rules, and
//! [`LiveGraph`] turns it into constructed nodes and back.

pub mod live;
pub mod types;
pub mod validator;

pub use live::{LiveGraph, LiveNode};
pub use types::*;
pub use validator::{validate_graph, Diagnostic, DiagnosticLevel, ValidationReport};
