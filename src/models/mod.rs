pub mod activity;
pub mod game;
pub mod purchase;
pub mod user;
