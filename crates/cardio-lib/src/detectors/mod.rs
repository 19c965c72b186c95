pub mod morphology;
pub mod patterns;
pub mod rpeak;
