// Domain types and order arithmetic shared by the futures toolkit.
// Nothing in this crate touches the network.

pub mod data;
pub mod strategy;
