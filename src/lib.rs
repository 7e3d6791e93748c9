#![doc = include_str!("../README.md")]

pub mod callback;
pub mod claims;
pub mod config;
pub mod controller;
pub mod error;
pub mod provider;
pub mod session;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use claims::extract_delegated_tokens;
pub use config::{CacheLocation, DEFAULT_CONNECTION, ProviderConfig};
pub use controller::SessionController;
pub use error::{Error, ProviderError};
pub use provider::{BrowserWindow, ClientFactory, IdentityProvider, LoginOptions, LogoutOptions};
pub use session::{Session, SessionPhase};
pub use store::SessionStore;
pub use types::{ClaimNamespace, ClaimSet, DEFAULT_CLAIM_NAMESPACE, Profile, TokenPair};
