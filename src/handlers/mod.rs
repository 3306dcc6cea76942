pub mod admin_auth;
pub mod contact;
pub mod imaging;
pub mod public;
pub mod resources;
