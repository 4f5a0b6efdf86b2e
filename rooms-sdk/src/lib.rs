//! Client SDK for the Rooms communication service
//!
//! This SDK provides a typed API to:
//! - Create, get, update and delete rooms
//! - Add, update, remove and list room participants
//! - Run the same operations from blocking code
//!
//! Every call is a single request/response exchange with the service; the
//! client keeps no state beyond its configuration.

pub mod blocking;
pub mod client;
pub mod errors;
pub mod models;
pub mod secret;
pub mod traits;
pub mod transport;

pub use blocking::BlockingRoomsClient;
pub use client::RoomsClient;
pub use errors::*;
pub use models::*;
pub use secret::{ValidateSecretResult, ValidationStatus};
pub use tokio_util::sync::CancellationToken;
pub use traits::*;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
