//! Contract bindings for the token contracts the watcher reads.
//!
//! All bindings are generated using alloy's `sol!` macro.

pub mod token;
