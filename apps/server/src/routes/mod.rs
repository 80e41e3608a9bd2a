pub mod bttn;
pub mod health;
