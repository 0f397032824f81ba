pub mod detection;
pub mod errors;
pub mod score;
