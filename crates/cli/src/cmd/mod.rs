//! Command implementations

pub mod catalog;
pub mod config;
pub mod init;
pub mod nodes;
pub mod price;
pub mod serve;
pub mod sheet;
pub mod sync;
pub mod tree;
pub mod vendor;
