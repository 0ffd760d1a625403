//! Config store adapters

mod xdg;

pub use xdg::XdgDefaultsStore;
