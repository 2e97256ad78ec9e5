pub mod auth;
pub mod nik;
pub mod pages;
