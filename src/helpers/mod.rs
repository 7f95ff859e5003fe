//! Pipeline building blocks
//!
//! Each helper does one thing and takes explicit inputs. The artifact name is
//! passed through purely so errors can say which artifact failed.
//!
//! - **fetch**: [`fetch::Fetch`] / [`fetch::Connector`] and the `ureq` implementation
//! - **tls**: client identity for mutual TLS against the internal host
//! - **hash**: SHA-256 verification
//! - **extract**: zip materialization and file relocation
//! - **fs_utils**: replace-directory primitive and small filesystem helpers
//! - **progress**: spinners and byte progress bars

pub mod extract;
pub mod fetch;
pub mod fs_utils;
pub mod hash;
pub mod progress;
pub mod tls;
