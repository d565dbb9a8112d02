pub mod chat;
pub mod gallery;
pub mod health;
pub mod pages;
pub mod rooms;
