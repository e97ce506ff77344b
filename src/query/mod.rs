pub mod period;
pub mod scope;

pub use period::{DateRange, Period};
pub use scope::{DashboardFilter, ProjectFilter, ScopedQuery};
