pub mod client;
pub mod derivation;
pub mod model;
pub mod query;
