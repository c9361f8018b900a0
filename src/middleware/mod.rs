pub mod auth;
pub mod extract;
pub mod response;

pub use auth::{require_admin, require_auth};
pub use extract::{IdParam, JsonBody};
pub use response::{ApiResponse, ApiResult};
