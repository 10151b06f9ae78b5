pub mod assembler;
pub mod dedup;
pub mod dispatcher;
pub mod engine;
pub mod registry;
pub mod scorer;

pub use dispatcher::{DispatchBudget, Dispatcher, SearchReport};
pub use engine::SearchEngine;
pub use registry::{EnabledSource, SourceRegistry};
