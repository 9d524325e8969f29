pub mod catalog;
pub mod comparison;
pub mod device;
pub mod job;
mod nullable;

pub use catalog::*;
pub use comparison::*;
pub use device::*;
pub use job::*;
