//! CLI subcommands. Each returns the text to print.

pub mod cart;
pub mod catalog;
pub mod product;
pub mod shipping;
