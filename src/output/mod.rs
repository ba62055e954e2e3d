#![forbid(unsafe_code)]

pub mod status;
pub mod table;
