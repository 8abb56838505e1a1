mod args;

pub use args::{Args, Invocation};
