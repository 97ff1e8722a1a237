pub mod clock;
pub mod id;
pub mod sleep;
pub mod task;
