pub mod dev;
pub mod health;
pub mod tools;
pub mod webhook;
