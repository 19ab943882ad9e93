pub mod health;
pub mod robots;
pub mod users;
