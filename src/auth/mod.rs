/// Authentication module
///
/// Access-token issuance/validation, password derivation, and refresh-token
/// lifecycle.
mod claims;
mod jwt;
mod password;
mod refresh_token;

pub use claims::Claims;
pub use claims::Role;
pub use jwt::generate_access_token;
pub use jwt::validate_access_token;
pub use password::derive_password_hash;
pub use password::verify_password;
pub use refresh_token::find_account_by_refresh_token;
pub use refresh_token::generate_refresh_token;
pub use refresh_token::remove_refresh_token;
pub use refresh_token::save_refresh_token;
