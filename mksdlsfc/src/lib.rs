//! Turns image files into C sources that embed the decoded pixels and hand
//! them out as an `SDL_Surface`.

pub mod codegen;
pub mod config;
pub mod convert;

pub use config::{Config, ConfigError};
pub use convert::{convert, ConvertError};
