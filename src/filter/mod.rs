pub mod criteria;
pub mod error;
pub mod filter;
pub mod filter_order;
pub mod filter_where;
pub mod types;

pub use criteria::AnimalCriteria;
pub use error::FilterError;
pub use filter::PredicateBuilder;
pub use types::*;
