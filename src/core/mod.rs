//! Vertex attribute and uniform contracts for the 2D sprite pipeline.
//!
//! Two independent contracts exist, [`VertexContract::Simple`] and
//! [`VertexContract::AtlasAware`]. Each is a static table of attribute slots, forwarded values and
//! uniform bindings; nothing here is mutated after definition. The rest of this module checks
//! producers and shaders against those tables.
//!
//! [`VertexContract::Simple`]: contract::VertexContract::Simple
//! [`VertexContract::AtlasAware`]: contract::VertexContract::AtlasAware

pub mod config;
pub mod contract;
pub mod error;
pub mod glsl;
pub mod link;
pub mod prelude;
pub mod stage;
pub mod uniform;
pub mod vertex;
