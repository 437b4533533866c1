pub mod abi;
pub mod demo;
pub mod target;
