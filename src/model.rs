pub mod selection;
pub mod tree;
