pub mod assemble;
pub mod config;
pub mod error;
pub mod filter;
pub mod ir;
pub mod parse;
pub mod pipeline;
pub mod reconcile;
pub mod resolve;
pub mod summary;
pub mod validate;
pub mod wasm;

pub use config::{CollectMode, CollectOptions};
pub use error::{CollectError, Phase};
pub use pipeline::{CollectContext, CollectRequest, collect};
