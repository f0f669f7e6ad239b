// Plugin runtime — runs host hooks across every registered plugin.

pub mod registry;

pub use registry::PluginRegistry;
