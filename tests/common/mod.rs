pub mod http;
pub mod mock_snapinsta;
