pub mod health;
pub mod transfer;
pub mod users;
