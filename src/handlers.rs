pub mod automation;
pub mod categories;
pub mod dashboard;
pub mod movements;
pub mod products;
