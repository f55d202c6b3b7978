pub mod store;
pub use store::{InventoryStore, StatusFilter, StockWrite};
pub mod memory;
pub use memory::InMemoryInventoryStore;
pub mod postgres;
pub use postgres::PostgresInventoryStore;
