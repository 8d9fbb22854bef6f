//! Repositories for the authentication service

pub mod credential;

pub use credential::{Credential, CredentialRepository, Profile};
