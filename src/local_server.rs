//! The helper page served from a loopback origin.
//!
//! `GET /` renders the session and captures `?code=` on return from the
//! provider, `POST /authorize` starts the flow and `POST /exchange` trades the
//! code for tokens.

mod config;
mod http;
mod page;
mod server;
mod target;

pub use config::{DEFAULT_HOST, DEFAULT_PORT, LocalServerConfig};
pub use server::HelperServer;
