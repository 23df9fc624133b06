pub mod api;
pub mod queries;
pub mod router;
pub mod state;
