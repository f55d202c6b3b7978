pub mod automation;
pub mod categories;
pub mod dashboard;
pub mod ledger;
pub mod products;
pub mod token;
