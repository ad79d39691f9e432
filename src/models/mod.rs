pub mod auth_types;
pub mod order;
pub mod role;
pub mod user;

pub use auth_types::{Claims, LoginQuery, TokenResponse};
pub use order::{OrderInput, OrderView};
pub use role::Role;
pub use user::{UserInput, UserView};
