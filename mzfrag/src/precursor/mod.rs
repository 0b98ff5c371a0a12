mod graph;
mod structure;
mod substructure;

pub use graph::*;
pub use structure::*;
pub use substructure::*;
