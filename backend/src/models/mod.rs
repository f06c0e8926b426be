pub mod fields;
pub mod time;

pub use time::*;
