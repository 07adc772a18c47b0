pub mod time;

pub use time::{FrameDriver, FrameTick};
