mod bindings;
mod filesystem;
mod platform;

pub(crate) use bindings::*;
pub(crate) use filesystem::*;
pub(crate) use platform::*;
