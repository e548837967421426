pub mod gen;
pub mod stats;
