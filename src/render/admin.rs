//! Static pages of the admin editor. The editor talks to the JSON API and
//! keeps unsaved edits in the browser until the user saves.

pub const LOGIN_PAGE: &str = include_str!("../../assets/login.html");
pub const ADMIN_PAGE: &str = include_str!("../../assets/admin.html");
