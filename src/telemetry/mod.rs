pub mod collector;
pub mod health;
pub mod history;
pub mod platform;
pub mod rates;
pub mod sampler;
pub mod snapshot;
pub mod thermal;
