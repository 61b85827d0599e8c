pub mod database;
pub mod store;

pub use database::*;
pub use store::*;
