pub mod component;
pub mod config;
pub mod translation;
pub mod tree;
