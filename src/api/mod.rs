pub mod client;
pub mod endpoints;
pub mod models;
pub mod transport;

pub use client::RiotApiClient;
pub use transport::{HttpResponse, MockTransport, Transport, UreqTransport};
