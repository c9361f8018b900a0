// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Catalogue browsing, account creation, sign-in and the contact form.

pub mod animals;
pub mod auth;
pub mod contact;
pub mod meta;
