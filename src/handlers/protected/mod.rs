// handlers/protected/mod.rs - Protected handlers (valid bearer token required)
//
// Every route here sits behind `require_auth`; handlers receive the verified
// `SessionClaims` as an extractor. Ownership checks happen per handler.

pub mod account;
pub mod adoptions;
pub mod donations;
pub mod requests;
pub mod users;
