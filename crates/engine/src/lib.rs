pub mod ledger;
pub mod processor;
pub mod registry;
pub mod token_store;
