mod auth;
mod health_check;

pub use auth::login;
pub use auth::logout;
pub use auth::refresh_token;
pub use auth::register;
pub use health_check::health_check;
