pub mod admin;
pub mod customer;
pub mod owner;
pub mod system;
