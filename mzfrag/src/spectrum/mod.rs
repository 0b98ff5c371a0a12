mod peak;
mod peaks;
mod tolerance;

pub use peak::*;
pub use peaks::*;
pub use tolerance::*;
