pub mod assemble;
pub mod blocks;
pub mod config;
pub mod delivery;
pub mod image;
pub mod link_index;
pub mod model;
pub mod render;
pub mod templates;
