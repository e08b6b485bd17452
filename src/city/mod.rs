//! City resource: model and storage behind the CRUD routes.

pub mod model;
pub mod service;

pub use model::{City, CityFilter, CityUpdate};
pub use service::{CityService, InMemoryCityService};
