pub mod types;
pub mod fetch;
pub mod store;
pub mod output;
pub mod events;
