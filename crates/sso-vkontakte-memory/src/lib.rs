// sso-vkontakte-memory — in-memory host stores.
//
// HashMap-backed implementations of every collaborator trait, with fault
// injection. Used by the test suites and for local development.

pub mod faults;
pub mod session;
pub mod store;

pub use faults::Faults;
pub use session::MemorySessionStore;
pub use store::{MemoryObjectStore, MemorySettingsStore, MemoryUserStore};
