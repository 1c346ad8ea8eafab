mod error;
mod model;
pub mod password;
pub mod service;

pub use error::AccountError;
pub use model::{NewUserRecord, User};
pub use service::AccountService;
