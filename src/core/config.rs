/// Explicit location reserved for the atlas texture size uniform. It sits well above the
/// low-numbered locations a renderer hands out to samplers and per-draw transforms; do not
/// renumber it.
pub const ATLAS_TEXTURE_SIZE_LOCATION: u32 = 34;
/// `GL_MAX_VERTEX_ATTRIBS` is at least 16 on every conforming implementation.
pub const MAX_VERTEX_ATTRIBUTES: u32 = 16;
/// `GL_MAX_UNIFORM_LOCATIONS` is at least 1024 on every conforming implementation.
pub const MAX_UNIFORM_LOCATIONS: u32 = 1024;
pub const MAX_DEPTH: f32 = 1.0;
pub const EPSILON: f32 = 1e-5;
