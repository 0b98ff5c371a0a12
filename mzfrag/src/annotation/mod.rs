mod ionization;
mod matcher;
mod parameters;
mod peak_match;

pub use ionization::*;
pub use matcher::*;
pub use parameters::*;
pub use peak_match::*;
