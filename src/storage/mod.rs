pub mod provider;
pub mod s3;

pub use provider::*;
pub use s3::S3Storage;
