pub mod auth;
pub mod character;
pub mod quote;
pub mod source;
