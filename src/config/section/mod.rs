//! Configuration section definitions.
//!
//! Each module corresponds to a section in `assetweb.toml`:
//!
//! | Module    | TOML Section  | Purpose                                  |
//! |-----------|---------------|------------------------------------------|
//! | `serve`   | `[serve]`     | Listener, workers, gzip, trusted proxies |
//! | `assets`  | `[assets]`    | Directory or bundle as asset root        |
//! | `cache`   | `[cache]`     | Cache-Control / ETag TTL                 |
//! | `cors`    | `[cors]`      | CORS headers                             |
//! | `replace` | `[[replace]]` | Per-file content substitution            |

mod assets;
mod cache;
pub mod cors;
mod replace;
mod serve;

pub use assets::AssetsConfig;
pub use cache::CacheConfig;
pub use cors::CorsConfig;
pub use replace::ReplaceItem;
pub use serve::ServeConfig;
