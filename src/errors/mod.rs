pub mod common;
pub mod lifecycle;
pub mod response;

pub use common::{CommonError, StoreError};
pub use lifecycle::{LifecycleError, LifecycleResult};
pub use response::{ApiError, ErrorResponse};
