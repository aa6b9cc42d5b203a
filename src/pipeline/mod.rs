pub mod state;
pub mod gateway;
pub mod relay;

pub use gateway::CompletionGateway;
pub use relay::{RelayStream, StreamRelay};
pub use state::{GatewayState, RelayState};
