pub mod account;
pub mod auth;
pub mod crud;
pub mod dashboard;
