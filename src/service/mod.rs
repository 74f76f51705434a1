//! CrudService: generic CRUD using the safe SQL builder.

mod crud;
mod validation;
pub use crud::CrudService;
pub use validation::{RequestValidator, RowValues};
