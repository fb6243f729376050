pub mod conversation;
pub mod extraction;
pub mod formatting;
pub mod numbers;
pub mod reservations;
pub mod routing;
pub mod schema;
