#[allow(unused_imports)]
pub use itertools::Itertools;

#[allow(unused_imports)]
pub use tracing::{error, info, warn};

#[allow(unused_imports)]
pub use crate::{
    core::{
        config::*,
        contract::{
            AttributeSemantic, AttributeSlot, ComponentType, ContractTable, ForwardedValue,
            InterpolationRole, UniformBinding, UniformLocation, UniformSemantic, VertexContract,
        },
        error::{ContractError, Mismatch},
        glsl::{GlslType, ShaderInterface},
        stage::{AtlasLookup, VertexOutput, VertexStage},
        uniform::{UniformSet, UniformValue},
        vertex::{AtlasVertex, ContractVertex, SimpleVertex},
    },
    util::{
        assert::*,
        colour::Colour,
        linalg::{Mat3x3, Vec2},
    },
};
