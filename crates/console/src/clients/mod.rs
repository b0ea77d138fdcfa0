//! Backend clients.
//!
//! `http` owns transport and session handling, `normalize` owns response
//! classification; the remaining modules map one backend resource each.

pub mod auth;
pub mod directory;
pub mod http;
pub mod normalize;
pub mod profiles;
pub mod shop;
pub mod support;
pub mod users;

pub use auth::{AuthClient, LoginRequest};
pub use directory::{BackendDirectory, Directory};
pub use http::ApiClient;
pub use normalize::Envelope;
pub use profiles::ProfileClient;
pub use shop::{ShopBackend, ShopClient};
pub use support::{SupportBackend, SupportClient};
pub use users::{UserClient, UserQuery};

#[cfg(any(test, feature = "test-utils"))]
pub use directory::MockDirectory;
#[cfg(any(test, feature = "test-utils"))]
pub use shop::MockShopBackend;
#[cfg(any(test, feature = "test-utils"))]
pub use support::MockSupportBackend;
