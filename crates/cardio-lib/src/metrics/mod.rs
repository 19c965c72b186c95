pub mod health;
pub mod hrv;
pub mod intervals;
pub mod ranges;
pub mod rhythm;
