pub mod grid;
pub mod spatial;
