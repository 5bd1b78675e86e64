mod bookings;
pub mod dto;
mod labs;
pub mod response;
mod router;
mod session;
mod slots;
mod users;
pub mod validation;
mod weekend;

pub use router::{AppState, api_router, create_router};
