//! xabranch - the resource side of XA two-phase commit
//!
//! This crate lets any local resource (a buffer, a connection, a session)
//! take part in a distributed transaction as one branch, driven by an external
//! transaction manager through the XA call set: `start`, `end`, `prepare`,
//! `commit`, `rollback`, `forget`, and `recover`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use xabranch::participant::{Participant, ParticipantConfig, ResourceLifecycleHooks, ResourceRegistry};
//! use xabranch::xa::{EndFlags, StartFlags, Xid};
//!
//! struct Buffers;
//!
//! impl ResourceLifecycleHooks<String> for Buffers {
//!     type Error = std::io::Error;
//!
//!     fn create_resource(&self) -> Result<String, Self::Error> { Ok(String::new()) }
//!     fn prepare(&self, _: &mut String) -> Result<(), Self::Error> { Ok(()) }
//!     fn commit(&self, buf: &mut String) -> Result<(), Self::Error> { println!("{buf}"); Ok(()) }
//!     fn rollback(&self, buf: &mut String) -> Result<(), Self::Error> { buf.clear(); Ok(()) }
//!     fn close(&self, _: &mut String) -> Result<(), Self::Error> { Ok(()) }
//! }
//!
//! let registry = ResourceRegistry::new();
//! let p = Participant::with_config(&registry, ParticipantConfig::new("buffer"), Arc::new(Buffers)).unwrap();
//!
//! let xid = Xid::generate();
//! p.start(&xid, StartFlags::NoFlags).unwrap();
//! p.accept(|buf| buf.push_str("hello"));
//! p.end(&xid, EndFlags::Success).unwrap();
//! p.commit(&xid, true).unwrap();
//! p.forget(&xid).unwrap();
//! ```

pub mod branch;
pub mod participant;
pub mod xa;
