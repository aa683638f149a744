pub mod handlers;
pub mod routes;
pub mod state;

pub use handlers::{create_router, dispatch, GATEWAY_VERSION};
pub use routes::{Capability, RouteError, RouteTable};
pub use state::AppState;
