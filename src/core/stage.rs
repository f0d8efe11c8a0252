use crate::{
    core::{
        contract::VertexContract,
        error::ContractError,
        uniform::UniformSet,
        vertex::{AtlasVertex, ContractVertex},
    },
    util::{colour::Colour, linalg::Vec2},
};

/// What the vertex stage hands on: the transformed position with depth as `z`, and the forwarded
/// values for the fragment stage.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexOutput {
    pub position: Vec2,
    pub depth: f32,
    pub uv: Vec2,
    pub colour: Colour,
}

/// A CPU reference of the vertex stage shared by both contracts.
///
/// Position goes through `u_TransMat`; UV and colour pass through untouched.
#[derive(Copy, Clone, Debug)]
pub struct VertexStage {
    contract: VertexContract,
}

impl VertexStage {
    pub fn new(contract: VertexContract) -> Self {
        Self { contract }
    }

    pub fn run<V: ContractVertex>(
        &self,
        vertex: &V,
        uniforms: &UniformSet,
    ) -> Result<VertexOutput, ContractError> {
        for found in [V::CONTRACT, uniforms.contract()] {
            if found != self.contract {
                return Err(ContractError::WrongContract {
                    expected: self.contract.name(),
                    found: found.name(),
                });
            }
        }
        let transform = uniforms.transform()?;
        Ok(VertexOutput {
            position: transform * vertex.position(),
            depth: vertex.depth(),
            uv: vertex.uv(),
            colour: vertex.colour(),
        })
    }
}

/// The quantities needed to map an interpolated UV into an atlas sub-region.
///
/// Region origin and size are in texels; `texture_size` is the full atlas size in pixels, taken
/// from the `u_textureSize` uniform.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AtlasLookup {
    pub origin: Vec2,
    pub size: Vec2,
    pub texture_size: Vec2,
}

impl AtlasLookup {
    pub fn gather(vertex: &AtlasVertex, uniforms: &UniformSet) -> Result<Self, ContractError> {
        if uniforms.contract() != VertexContract::AtlasAware {
            return Err(ContractError::WrongContract {
                expected: VertexContract::AtlasAware.name(),
                found: uniforms.contract().name(),
            });
        }
        let texture_size = uniforms.atlas_texture_size()?;
        Ok(Self {
            origin: vertex.region_origin.into(),
            size: vertex.region_size.into(),
            texture_size,
        })
    }

    /// `(origin + uv * size) / texture_size`.
    pub fn normalized(&self, uv: Vec2) -> Vec2 {
        (self.origin + uv.component_wise(self.size)).component_wise_div(self.texture_size)
    }
}
