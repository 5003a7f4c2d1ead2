mod backtrace;
mod error_body;
mod error_code;
mod error_from_kube;
mod error_impl;
mod error_inner;
mod error_kind;
mod error_message;
mod error_name;
mod result;

pub use backtrace::*;
pub use error_code::*;
pub use error_impl::*;
pub use error_inner::*;
pub use error_kind::*;
pub use error_message::*;
pub use error_name::*;
pub use result::*;
