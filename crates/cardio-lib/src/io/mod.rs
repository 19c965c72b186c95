pub mod binary;
pub mod csv;
pub mod text;
