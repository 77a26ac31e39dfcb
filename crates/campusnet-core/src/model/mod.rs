//! Policy and directory data model.
//!
//! Identities and servers form the directory, enrollment groups carry the
//! access policy, and connections record what has been programmed into the
//! network on behalf of an authorized request.

mod address;
mod connection;
mod directory;
mod group;

pub use address::HardwareAddress;
pub use connection::{Connection, ConnectionKey};
pub use directory::{Identity, Server, Service, TransportProtocol};
pub use group::{AllowRule, EnrollmentGroup, GroupStatus};
