mod http;
pub mod service;

pub use http::{router, AdminState};
