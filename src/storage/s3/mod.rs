pub mod client;
pub mod objects;
pub mod provider;
pub mod signer;

pub use client::Client;
pub use provider::S3Storage;
