pub mod file;
pub mod repository;
pub mod token;
pub mod validate;

pub use file::FileService;
pub use repository::FileRepository;
pub use token::TokenVerifier;
