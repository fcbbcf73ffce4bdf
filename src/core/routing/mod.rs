//! Request routing
//!
//! Translates an opaque action identifier plus a JSON parameter payload
//! into a concrete upstream method, path and query string or body. The
//! dispatch table is static data keyed by action name; unknown identifiers
//! are reported generically, never echoed back.

mod table;
mod target;


pub use table::{ActionRoute, RouteTable};
pub use target::{build_query, resolve_path};
