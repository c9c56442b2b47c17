pub mod check_password;
pub mod health;

pub use check_password::{check_password, method_not_allowed};
pub use health::health_check;
