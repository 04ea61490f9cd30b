pub mod generation;
pub mod media;
pub mod operations;
pub mod tours;
pub mod worlds;
