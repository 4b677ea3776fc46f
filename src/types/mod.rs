//! Data types for sections, cells and presentation modes.

mod cell;
mod mode;
mod section;

pub use cell::*;
pub use mode::*;
pub use section::*;
