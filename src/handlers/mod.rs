// handlers/mod.rs - 3-tier handler layout
//
// Public (no auth) → Protected (bearer token) → Elevated (bearer token with admin role)

pub mod common;
pub mod elevated;
pub mod protected;
pub mod public;
