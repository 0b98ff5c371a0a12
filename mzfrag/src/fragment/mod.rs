mod fragment;

pub use fragment::*;
