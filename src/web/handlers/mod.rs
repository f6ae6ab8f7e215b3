pub mod backends;
pub mod rank;
