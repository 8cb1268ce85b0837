pub mod field;
pub mod point;
