extern crate self as bitscript_core;

pub mod log;
