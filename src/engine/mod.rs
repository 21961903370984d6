// Brio Assistant Engine — Engine modules

pub mod chat;
pub mod classifier;
pub mod health;
pub mod learning;
pub mod processor;
pub mod providers;
pub mod registry;
pub mod routing;
pub mod search;
pub mod store;
pub mod tools;
