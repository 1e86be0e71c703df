pub mod adapters;
pub mod codec;
pub mod error;
pub mod extract;
pub mod http;
pub mod media;
pub mod packed;
pub mod server;
