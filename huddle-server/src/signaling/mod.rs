mod authenticator;
mod relay;
mod router;
mod session;
mod ws_handler;

pub use authenticator::*;
pub use relay::*;
pub use router::*;
pub use session::*;
pub use ws_handler::*;
