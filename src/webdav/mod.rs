//! WebDAV Bridge
//!
//! Manual backup and restore of the dashboard against a user-supplied WebDAV
//! server. The browser cannot issue `PROPFIND`/`MKCOL` cross-origin, so the
//! service relays them. Each request carries its own connection config; the
//! service keeps no WebDAV state.
//!
//! Operations posted to `/api/webdav`:
//!
//! - `check` - depth-0 `PROPFIND` on the base URL
//! - `upload` - create `cloudnav/` if missing, then `PUT cloudnav/backup.json`
//! - `download` - `GET cloudnav/backup.json`, `null` when absent

pub mod client;
mod handler;
mod routes;

pub use client::WebDavClient;
pub use routes::routes;
