//! The authenticated HTTP pipeline: transport seam, credential attachment,
//! silent refresh, and error classification.

pub mod client;
pub mod refresh;
pub mod report;
pub mod transport;

pub use client::ApiClient;
pub use refresh::RefreshCoordinator;
pub use report::{ErrorReporter, Notifier, TracingNotifier};
pub use transport::{ApiRequest, HttpTransport, RawResponse, ReqwestTransport, TransportError};
