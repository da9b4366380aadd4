pub mod assemble;
pub mod config;
pub mod context;
pub mod encode;
pub mod error;
pub mod finalize;
pub mod listing;
pub mod output;
pub mod parser;
pub mod pass1;
pub mod pass2;
pub mod symbol;
pub mod token;

pub use assemble::{assemble, Failure};
pub use context::Options;
pub use error::Error;
pub use finalize::Object;
