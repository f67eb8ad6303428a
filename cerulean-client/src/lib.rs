//! Cerulean Azure Resource Manager client
//!
//! Request transport for resource handlers.
//!
//! ## Module Structure
//!
//! - `config` - Endpoint, credentials, retry and polling settings
//! - `http` - Authenticated requests with transient-failure retry
//! - `poller` - Poll-until-terminal with injectable backoff and cancellation
//! - `future` - Long-running operation handles built from initial responses
//! - `healthcare` - Microsoft.HealthcareApis/services models and operations

pub mod config;
pub mod error;
pub mod future;
pub mod healthcare;
pub mod http;
pub mod poller;

pub use config::{ClientConfig, PollConfig};
pub use error::{ClientError, ClientResult};
pub use future::OperationFuture;
pub use healthcare::{HealthcareServicesApi, ServicesClient};
pub use http::{ArmHttpClient, RawResponse};
pub use poller::{Backoff, ExponentialBackoff, FixedBackoff, PollSource, PollStatus, Poller};
pub use reqwest::StatusCode;
