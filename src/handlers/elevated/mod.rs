// handlers/elevated/mod.rs - Administrator handlers
//
// Routes here run behind `require_auth` and then `require_admin`.

pub mod adoptions;
pub mod animals;
pub mod contact;
pub mod donations;
pub mod requests;
pub mod users;
