//! CustomerService and request validation.

mod customer;
mod validation;
pub use customer::CustomerService;
pub use validation::{RequestValidator, MAX_PAGE_LIMIT, MAX_POPULATE_COUNT};
