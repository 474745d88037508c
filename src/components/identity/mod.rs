pub mod client;
pub mod models;
pub mod pkce;

pub use client::{GoogleIdentityClient, IdentityProvider};
pub use models::{AccessToken, UserProfile};
pub use pkce::PkceChallenge;
