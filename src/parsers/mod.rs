pub mod component;
pub mod resource;
