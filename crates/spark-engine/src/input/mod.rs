pub mod pointer;
pub mod queue;

pub use pointer::Pointer;
pub use queue::{InputEvent, InputQueue};
