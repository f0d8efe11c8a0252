use crate::{
    check_eq,
    core::{config::MAX_DEPTH, contract::VertexContract, error::ContractError},
    util::{colour::Colour, linalg::Vec2},
};
use vulkano::{buffer::BufferContents, pipeline::graphics::vertex_input::Vertex as VkVertex};

/// A CPU-side vertex record laid out to match one [`VertexContract`].
pub trait ContractVertex: VkVertex + bincode::Encode {
    const CONTRACT: VertexContract;

    fn position(&self) -> Vec2;
    fn colour(&self) -> Colour;
    fn uv(&self) -> Vec2;
    fn depth(&self) -> f32;
    /// Atlas region origin and size, in texels.
    fn atlas_region(&self) -> Option<(Vec2, Vec2)> {
        None
    }

    /// Encodes the record as it is laid out in a vertex buffer: little-endian `f32`s in location
    /// order, no padding.
    fn to_bytes(&self) -> Result<Vec<u8>, ContractError> {
        let config = bincode::config::standard()
            .with_little_endian()
            .with_fixed_int_encoding();
        let bytes = bincode::encode_to_vec(self, config)?;
        check_eq!(bytes.len(), Self::CONTRACT.stride() as usize);
        Ok(bytes)
    }
}

/// Concatenates the encoded records, ready to be copied into a vertex buffer.
pub fn encode_all<V: ContractVertex>(vertices: &[V]) -> Result<Vec<u8>, ContractError> {
    let mut bytes = Vec::with_capacity(vertices.len() * V::CONTRACT.stride() as usize);
    for vertex in vertices {
        bytes.extend(vertex.to_bytes()?);
    }
    Ok(bytes)
}

fn clamp_depth(depth: f32) -> f32 {
    depth.min(MAX_DEPTH)
}

#[derive(BufferContents, VkVertex, bincode::Encode, Debug, Default, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct SimpleVertex {
    #[name("v_pos")]
    #[format(R32G32_SFLOAT)]
    pub position: [f32; 2],
    #[name("v_col")]
    #[format(R32G32B32A32_SFLOAT)]
    pub colour: [f32; 4],
    #[name("v_uv")]
    #[format(R32G32_SFLOAT)]
    pub uv: [f32; 2],
    #[name("v_depth")]
    #[format(R32_SFLOAT)]
    pub depth: f32,
}

impl SimpleVertex {
    pub fn new(position: Vec2, colour: Colour, uv: Vec2, depth: f32) -> Self {
        Self {
            position: position.into(),
            colour: colour.into(),
            uv: uv.into(),
            depth: clamp_depth(depth),
        }
    }
}

impl ContractVertex for SimpleVertex {
    const CONTRACT: VertexContract = VertexContract::Simple;

    fn position(&self) -> Vec2 {
        self.position.into()
    }
    fn colour(&self) -> Colour {
        self.colour.into()
    }
    fn uv(&self) -> Vec2 {
        self.uv.into()
    }
    fn depth(&self) -> f32 {
        self.depth
    }
}

#[derive(BufferContents, VkVertex, bincode::Encode, Debug, Default, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct AtlasVertex {
    #[name("v_pos")]
    #[format(R32G32_SFLOAT)]
    pub position: [f32; 2],
    #[name("v_col")]
    #[format(R32G32B32A32_SFLOAT)]
    pub colour: [f32; 4],
    #[name("v_uv")]
    #[format(R32G32_SFLOAT)]
    pub uv: [f32; 2],
    #[name("v_texRegionOrigin")]
    #[format(R32G32_SFLOAT)]
    pub region_origin: [f32; 2],
    #[name("v_texRegionSize")]
    #[format(R32G32_SFLOAT)]
    pub region_size: [f32; 2],
    #[name("v_depth")]
    #[format(R32_SFLOAT)]
    pub depth: f32,
}

impl AtlasVertex {
    /// `region_origin` and `region_size` are in texels of the atlas texture.
    pub fn new(
        position: Vec2,
        colour: Colour,
        uv: Vec2,
        region_origin: Vec2,
        region_size: Vec2,
        depth: f32,
    ) -> Self {
        Self {
            position: position.into(),
            colour: colour.into(),
            uv: uv.into(),
            region_origin: region_origin.into(),
            region_size: region_size.into(),
            depth: clamp_depth(depth),
        }
    }
}

impl ContractVertex for AtlasVertex {
    const CONTRACT: VertexContract = VertexContract::AtlasAware;

    fn position(&self) -> Vec2 {
        self.position.into()
    }
    fn colour(&self) -> Colour {
        self.colour.into()
    }
    fn uv(&self) -> Vec2 {
        self.uv.into()
    }
    fn depth(&self) -> f32 {
        self.depth
    }
    fn atlas_region(&self) -> Option<(Vec2, Vec2)> {
        Some((self.region_origin.into(), self.region_size.into()))
    }
}
