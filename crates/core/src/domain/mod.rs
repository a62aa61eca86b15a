pub mod caller;
pub mod candidate;
