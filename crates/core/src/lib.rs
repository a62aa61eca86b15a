pub mod config;
pub mod domain;
pub mod errors;
pub mod lookup;
pub mod retry;

pub use domain::caller::CallerContext;
pub use domain::candidate::{
    first_above_threshold, select_top_voted, CandidateList, DefinitionCandidate,
};
pub use errors::LookupError;
pub use lookup::{DefinitionSource, DictionaryClient, RandomWordPolicy};
pub use retry::RetryPolicy;
