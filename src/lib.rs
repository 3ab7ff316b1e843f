//! A DNS wire format codec, and an async stub resolver.
//!
//! Messages are built and parsed with [`Message`]. Queries are sent with the
//! clients in [`clients`], which speak DNS over UDP, falling back to TCP when
//! a response is truncated. [`clients::Resolver`] wraps them with address,
//! reverse and generic record lookups.
//!
//! ```rust,no_run
//! use dnsclient::clients::Resolver;
//! use dnsclient::Type;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), dnsclient::Error> {
//!     let resolver = Resolver::new("8.8.8.8:53")?;
//!
//!     for ip in resolver.lookup("example.com", Type::A).await? {
//!         println!("{}", ip);
//!     }
//!
//!     println!("{}", resolver.reverse("8.8.8.8".parse().unwrap()).await?);
//!     Ok(())
//! }
//! ```
#[macro_use]
mod cfg;

mod display;
mod dns;
mod errors;
mod from_str;
mod io;
pub mod name;
pub mod resource;
pub mod types;

cfg_feature! {
    #![feature = "tcp"]
    pub mod clients;
}

#[macro_use]
extern crate lazy_static;

pub use crate::dns::HEADER_LEN;
pub use crate::errors::{Error, Result};
pub use crate::from_str::FromStrError;
pub use crate::types::*;

// Pull up the various types that should be on the front page of the docs.
#[doc(inline)]
pub use crate::name::Name;
#[doc(inline)]
pub use crate::resource::{Resource, MX, SOA};
#[doc(inline)]
pub use crate::types::Message;
#[doc(inline)]
pub use crate::types::Question;
#[doc(inline)]
pub use crate::types::Record;

#[doc(inline)]
pub use crate::types::Class;

#[doc(inline)]
pub use crate::types::Type;
