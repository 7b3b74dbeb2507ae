//! Log target names for the styling system.
//!
//! Filter on these with `tracing` directives, e.g.
//! `RUST_LOG=tessera_style::emulation=trace`.

/// Target names for log filtering.
pub mod targets {
    /// Definition classification and class registration.
    pub const PARSE: &str = "tessera_style::parse";
    /// Flattening, bucketing and combination of pseudo-class groups.
    pub const PSEUDO: &str = "tessera_style::pseudo";
    /// Per-component attach, detach and state transitions.
    pub const EMULATION: &str = "tessera_style::emulation";
    /// Stylesheet rule registration.
    pub const BACKEND: &str = "tessera_style::backend";
}
