mod macros;
mod parsing;

pub use parsing::*;
