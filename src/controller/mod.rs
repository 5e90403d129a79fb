//! Motion controller for the TMC5130.
//!
//! Provides the register-level motion command surface and the sticky
//! reference latch tracking it depends on.

mod builder;
mod driver;
mod latch;

pub use builder::Tmc5130Builder;
pub use driver::Tmc5130;
pub use latch::{LatchFlag, LatchState, ReferenceSwitch};
