//! Business logic services

pub mod context;
pub mod error;
pub mod locks;
pub mod poll;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use locks::{PollGuard, PollLocks};
pub use poll::PollService;
