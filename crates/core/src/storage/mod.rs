pub mod cache;
pub mod collection;
pub mod document;
pub mod memory;
pub mod redb_store;
pub mod repository;
pub mod seed;
pub mod store;
pub mod unit_of_work;
