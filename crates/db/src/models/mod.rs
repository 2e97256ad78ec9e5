pub mod nik_confirmation;
pub mod sap_session;
pub mod user;
