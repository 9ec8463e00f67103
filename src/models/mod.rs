pub mod calendar;
pub mod entities;
pub mod equipment;
pub mod macros;
pub mod schedule;

pub use calendar::*;
pub use entities::*;
pub use equipment::*;
pub use schedule::*;
