mod config;
mod constants;
mod error;
mod get_kube_client;
mod labels;
mod serialize;
mod status;
mod tracing;

pub use config::*;
pub use constants::*;
pub use error::*;
pub use get_kube_client::*;
pub use labels::*;
pub use serialize::*;
pub use status::*;
pub use tracing::*;
