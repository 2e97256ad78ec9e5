mod nik_confirmation_repo;
mod sap_session_repo;
mod user_repo;

pub use nik_confirmation_repo::NikConfirmationRepo;
pub use sap_session_repo::SapSessionRepo;
pub use user_repo::UserRepo;
