pub mod analyzer;
pub mod cancel;
pub mod classifier;
pub mod eraser;
pub mod events;
pub mod progress;
pub mod scanner;
pub mod session;
