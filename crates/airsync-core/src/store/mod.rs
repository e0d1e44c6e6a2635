// ── Reactive access point store ──

mod registry;

pub use registry::{Registry, Snapshot};
