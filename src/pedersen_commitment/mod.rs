pub mod native;

pub use native::*;
