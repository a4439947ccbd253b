//! ctfd-gateway
//!
//! The remote boundary consumed by the reconciliation core.
//!
//! - [`wire`]: request / response shapes of the CTFd REST API.
//! - [`CtfdApi`]: the adapter trait implemented by the live HTTP client and
//!   by test doubles.
//! - [`Gateway`]: the single choke-point the core calls through. It refuses
//!   every call once the shared [`CancelToken`] has fired.
//!
//! The gateway owns no reconciliation logic.

mod adapter;
mod cancel;
mod error;
mod gateway;
pub mod wire;

pub use adapter::CtfdApi;
pub use cancel::CancelToken;
pub use error::GatewayError;
pub use gateway::Gateway;

/// Convenience alias for adapter and gateway results.
pub type GatewayResult<T> = Result<T, GatewayError>;
