pub mod errors;
pub mod metric;
pub mod point;
pub mod scaling;

pub use errors::*;
pub use metric::*;
pub use point::*;
pub use scaling::*;
