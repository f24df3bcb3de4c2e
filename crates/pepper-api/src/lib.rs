// pepper-api: Async Rust client for the salt-api login and local execution endpoints

pub mod error;
pub mod models;
pub mod session;
pub mod transport;

pub use error::Error;
pub use models::{AuthContext, Credentials, ExprForm, Invocation, TargetExpr};
pub use session::SessionClient;
pub use transport::{HTTP_TRACE_TARGET, TransportConfig};
