//! Show description: timed firework events, where they come from, and the
//! clock that launches them.

mod event;
pub mod scheduler;
pub mod source;

pub use event::{FireworkKind, ShowEvent};
pub use scheduler::Scheduler;
pub use source::ShowError;
