//! Middlewares, in the order the server installs them: CORS, cache, gzip.

mod cache;
mod cors;
mod gzip;

pub use cache::CacheNegotiation;
pub use cors::Cors;
pub use gzip::Gzip;
