//! Handlers 模块

pub mod intents;
pub mod metrics;
pub mod spaces;
pub mod undo;

pub use intents::*;
pub use metrics::*;
pub use spaces::*;
pub use undo::*;
