pub mod auth;
pub mod products;
pub mod users;

pub use auth::{AuthError, AuthResponse, AuthService};
pub use products::{PgProductService, ProductService};
pub use users::{PgUserService, UserService};
