//! Customer service: customer record CRUD over HTTP with a bulk test-data generator.

pub mod config;
pub mod dev;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod model;
pub mod openapi;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use config::{ServiceConfig, StoreKind};
pub use dev::{clear_all, populate, BulkGenerator, ClearOutcome, PopulateOutcome};
pub use error::{AppError, ConfigError, DevError, StoreError};
pub use logging::init_tracing;
pub use model::{Customer, CustomerPatch, NewCustomer, Page};
pub use response::{success_one, success_one_ok, success_page};
pub use routes::{app, common_routes, customer_routes, dev_routes};
pub use service::CustomerService;
pub use state::AppState;
pub use store::{ensure_database_exists, open_store, CustomerStore, MemoryStore, PgCustomerStore};
