pub mod assistant;
pub mod call;
pub mod candidate;
