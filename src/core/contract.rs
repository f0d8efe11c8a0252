use crate::core::{config::*, error::ContractError};
use itertools::Itertools;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    fmt::Formatter,
};
use vulkano::format::Format;

/// The shape of a single attribute or uniform. Every component is a 32-bit float.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Float,
    Vec2,
    Vec4,
    Mat3,
}

impl ComponentType {
    pub fn glsl_name(self) -> &'static str {
        match self {
            ComponentType::Float => "float",
            ComponentType::Vec2 => "vec2",
            ComponentType::Vec4 => "vec4",
            ComponentType::Mat3 => "mat3",
        }
    }

    pub fn from_glsl_name(name: &str) -> Option<Self> {
        match name {
            "float" => Some(ComponentType::Float),
            "vec2" => Some(ComponentType::Vec2),
            "vec4" => Some(ComponentType::Vec4),
            "mat3" => Some(ComponentType::Mat3),
            _ => None,
        }
    }

    pub fn component_count(self) -> u32 {
        match self {
            ComponentType::Float => 1,
            ComponentType::Vec2 => 2,
            ComponentType::Vec4 => 4,
            ComponentType::Mat3 => 9,
        }
    }

    pub fn size_bytes(self) -> u32 {
        self.component_count() * std::mem::size_of::<f32>() as u32
    }

    /// The vertex input format for this type, or `None` if it cannot feed a vertex attribute.
    pub fn vertex_format(self) -> Option<Format> {
        match self {
            ComponentType::Float => Some(Format::R32_SFLOAT),
            ComponentType::Vec2 => Some(Format::R32G32_SFLOAT),
            ComponentType::Vec4 => Some(Format::R32G32B32A32_SFLOAT),
            ComponentType::Mat3 => None,
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glsl_name())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeSemantic {
    Position,
    Colour,
    Uv,
    AtlasOrigin,
    AtlasSize,
    Depth,
}

impl fmt::Display for AttributeSemantic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttributeSemantic::Position => "position",
            AttributeSemantic::Colour => "colour",
            AttributeSemantic::Uv => "uv",
            AttributeSemantic::AtlasOrigin => "atlas_origin",
            AttributeSemantic::AtlasSize => "atlas_size",
            AttributeSemantic::Depth => "depth",
        };
        write!(f, "{name}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UniformSemantic {
    Transform,
    AtlasTextureSize,
}

impl fmt::Display for UniformSemantic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            UniformSemantic::Transform => write!(f, "transform"),
            UniformSemantic::AtlasTextureSize => write!(f, "atlas_texture_size"),
        }
    }
}

/// Whether an attribute is used up by the vertex stage or passed through to the fragment stage.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InterpolationRole {
    VertexStage,
    Forwarded,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AttributeSlot {
    pub location: u32,
    pub semantic: AttributeSemantic,
    pub component_type: ComponentType,
    pub shader_name: &'static str,
    pub role: InterpolationRole,
}

/// A value written by the vertex stage and interpolated for the fragment stage. These carry no
/// location; they are matched to fragment inputs by name.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ForwardedValue {
    pub semantic: AttributeSemantic,
    pub component_type: ComponentType,
    pub shader_name: &'static str,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UniformLocation {
    Implicit,
    Explicit(u32),
}

impl UniformLocation {
    pub fn explicit(self) -> Option<u32> {
        match self {
            UniformLocation::Implicit => None,
            UniformLocation::Explicit(location) => Some(location),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UniformBinding {
    pub location: UniformLocation,
    pub semantic: UniformSemantic,
    pub component_type: ComponentType,
    pub shader_name: &'static str,
}

/// The forwarded interface the fragment stage expects. Each contract declares its own copy.
pub const FORWARDED_INTERFACE: [ForwardedValue; 2] = [
    ForwardedValue {
        semantic: AttributeSemantic::Uv,
        component_type: ComponentType::Vec2,
        shader_name: "f_uv",
    },
    ForwardedValue {
        semantic: AttributeSemantic::Colour,
        component_type: ComponentType::Vec4,
        shader_name: "f_col",
    },
];

static SIMPLE_ATTRIBUTES: [AttributeSlot; 4] = [
    AttributeSlot {
        location: 0,
        semantic: AttributeSemantic::Position,
        component_type: ComponentType::Vec2,
        shader_name: "v_pos",
        role: InterpolationRole::VertexStage,
    },
    AttributeSlot {
        location: 1,
        semantic: AttributeSemantic::Colour,
        component_type: ComponentType::Vec4,
        shader_name: "v_col",
        role: InterpolationRole::Forwarded,
    },
    AttributeSlot {
        location: 2,
        semantic: AttributeSemantic::Uv,
        component_type: ComponentType::Vec2,
        shader_name: "v_uv",
        role: InterpolationRole::Forwarded,
    },
    AttributeSlot {
        location: 3,
        semantic: AttributeSemantic::Depth,
        component_type: ComponentType::Float,
        shader_name: "v_depth",
        role: InterpolationRole::VertexStage,
    },
];

static SIMPLE_FORWARDED: [ForwardedValue; 2] = [
    ForwardedValue {
        semantic: AttributeSemantic::Uv,
        component_type: ComponentType::Vec2,
        shader_name: "f_uv",
    },
    ForwardedValue {
        semantic: AttributeSemantic::Colour,
        component_type: ComponentType::Vec4,
        shader_name: "f_col",
    },
];

static SIMPLE_UNIFORMS: [UniformBinding; 1] = [UniformBinding {
    location: UniformLocation::Implicit,
    semantic: UniformSemantic::Transform,
    component_type: ComponentType::Mat3,
    shader_name: "u_TransMat",
}];

static ATLAS_AWARE_ATTRIBUTES: [AttributeSlot; 6] = [
    AttributeSlot {
        location: 0,
        semantic: AttributeSemantic::Position,
        component_type: ComponentType::Vec2,
        shader_name: "v_pos",
        role: InterpolationRole::VertexStage,
    },
    AttributeSlot {
        location: 1,
        semantic: AttributeSemantic::Colour,
        component_type: ComponentType::Vec4,
        shader_name: "v_col",
        role: InterpolationRole::Forwarded,
    },
    AttributeSlot {
        location: 2,
        semantic: AttributeSemantic::Uv,
        component_type: ComponentType::Vec2,
        shader_name: "v_uv",
        role: InterpolationRole::Forwarded,
    },
    AttributeSlot {
        location: 3,
        semantic: AttributeSemantic::AtlasOrigin,
        component_type: ComponentType::Vec2,
        shader_name: "v_texRegionOrigin",
        role: InterpolationRole::VertexStage,
    },
    AttributeSlot {
        location: 4,
        semantic: AttributeSemantic::AtlasSize,
        component_type: ComponentType::Vec2,
        shader_name: "v_texRegionSize",
        role: InterpolationRole::VertexStage,
    },
    AttributeSlot {
        location: 5,
        semantic: AttributeSemantic::Depth,
        component_type: ComponentType::Float,
        shader_name: "v_depth",
        role: InterpolationRole::VertexStage,
    },
];

static ATLAS_AWARE_FORWARDED: [ForwardedValue; 2] = [
    ForwardedValue {
        semantic: AttributeSemantic::Uv,
        component_type: ComponentType::Vec2,
        shader_name: "f_uv",
    },
    ForwardedValue {
        semantic: AttributeSemantic::Colour,
        component_type: ComponentType::Vec4,
        shader_name: "f_col",
    },
];

static ATLAS_AWARE_UNIFORMS: [UniformBinding; 2] = [
    UniformBinding {
        location: UniformLocation::Implicit,
        semantic: UniformSemantic::Transform,
        component_type: ComponentType::Mat3,
        shader_name: "u_TransMat",
    },
    UniformBinding {
        location: UniformLocation::Explicit(ATLAS_TEXTURE_SIZE_LOCATION),
        semantic: UniformSemantic::AtlasTextureSize,
        component_type: ComponentType::Vec2,
        shader_name: "u_textureSize",
    },
];

/// The declaration tables of one contract: attribute slots in declaration order, forwarded values
/// and uniform bindings.
#[derive(Copy, Clone, Debug)]
pub struct ContractTable<'a> {
    pub name: &'static str,
    pub attributes: &'a [AttributeSlot],
    pub forwarded: &'a [ForwardedValue],
    pub uniforms: &'a [UniformBinding],
}

impl ContractTable<'_> {
    pub fn offset_of(&self, semantic: AttributeSemantic) -> Option<u32> {
        let mut offset = 0;
        for slot in self.attributes {
            if slot.semantic == semantic {
                return Some(offset);
            }
            offset += slot.component_type.size_bytes();
        }
        None
    }

    pub fn stride(&self) -> u32 {
        self.attributes
            .iter()
            .map(|slot| slot.component_type.size_bytes())
            .sum()
    }

    /// Checks the binding layout invariants. Returns the first violation found.
    pub fn validate(&self) -> Result<(), ContractError> {
        self.validate_attributes()?;
        self.validate_names()?;
        self.validate_forwarded()?;
        self.validate_uniforms()
    }

    fn validate_attributes(&self) -> Result<(), ContractError> {
        let mut semantics = BTreeSet::new();
        for (expected, slot) in (0..).zip(self.attributes) {
            if slot.location != expected {
                return Err(ContractError::NonContiguousLocation {
                    contract: self.name,
                    name: slot.shader_name,
                    expected,
                    found: slot.location,
                });
            }
            if slot.location >= MAX_VERTEX_ATTRIBUTES {
                return Err(ContractError::LocationOutOfRange {
                    contract: self.name,
                    name: slot.shader_name,
                    location: slot.location,
                    limit: MAX_VERTEX_ATTRIBUTES,
                });
            }
            if slot.component_type.vertex_format().is_none() {
                return Err(ContractError::InvalidAttributeType {
                    contract: self.name,
                    name: slot.shader_name,
                    ty: slot.component_type,
                });
            }
            if !semantics.insert(slot.semantic) {
                return Err(ContractError::DuplicateSemantic {
                    contract: self.name,
                    semantic: slot.semantic.to_string(),
                });
            }
        }
        Ok(())
    }

    fn validate_names(&self) -> Result<(), ContractError> {
        let names = self
            .attributes
            .iter()
            .map(|slot| slot.shader_name)
            .chain(self.forwarded.iter().map(|value| value.shader_name))
            .chain(self.uniforms.iter().map(|binding| binding.shader_name));
        if let Some(name) = names.duplicates().next() {
            return Err(ContractError::DuplicateName {
                contract: self.name,
                name,
            });
        }
        Ok(())
    }

    fn validate_forwarded(&self) -> Result<(), ContractError> {
        if self.forwarded != FORWARDED_INTERFACE {
            return Err(ContractError::ForwardedMismatch {
                contract: self.name,
                reason: format!(
                    "declares [{}], fragment stage expects [{}]",
                    describe_forwarded(self.forwarded),
                    describe_forwarded(&FORWARDED_INTERFACE),
                ),
            });
        }
        for value in self.forwarded {
            let source = self
                .attributes
                .iter()
                .find(|slot| slot.semantic == value.semantic);
            match source {
                Some(slot)
                    if slot.component_type == value.component_type
                        && slot.role == InterpolationRole::Forwarded => {}
                Some(slot) => {
                    return Err(ContractError::ForwardedMismatch {
                        contract: self.name,
                        reason: format!(
                            "`{}` cannot pass through `{}` ({} {:?})",
                            value.shader_name, slot.shader_name, slot.component_type, slot.role
                        ),
                    });
                }
                None => {
                    return Err(ContractError::ForwardedMismatch {
                        contract: self.name,
                        reason: format!("`{}` has no source attribute", value.shader_name),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_uniforms(&self) -> Result<(), ContractError> {
        let mut explicit: BTreeMap<u32, &'static str> = BTreeMap::new();
        for binding in self.uniforms {
            let Some(location) = binding.location.explicit() else {
                continue;
            };
            if location >= MAX_UNIFORM_LOCATIONS {
                return Err(ContractError::LocationOutOfRange {
                    contract: self.name,
                    name: binding.shader_name,
                    location,
                    limit: MAX_UNIFORM_LOCATIONS,
                });
            }
            if let Some(first) = explicit.insert(location, binding.shader_name) {
                return Err(ContractError::UniformLocationCollision {
                    contract: self.name,
                    first,
                    second: binding.shader_name,
                    location,
                });
            }
        }
        Ok(())
    }
}

fn describe_forwarded(values: &[ForwardedValue]) -> String {
    values
        .iter()
        .map(|value| format!("{} {}", value.component_type, value.shader_name))
        .join(", ")
}

/// The two vertex contracts. They are deployed as separate shader programs and share no
/// declarations, even where their semantics overlap.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VertexContract {
    /// Position, colour, UV, depth; one transform uniform.
    Simple,
    /// [`Simple`](VertexContract::Simple) plus per-vertex atlas region origin and size, and the
    /// atlas texture size uniform at [`ATLAS_TEXTURE_SIZE_LOCATION`].
    AtlasAware,
}

impl VertexContract {
    pub const ALL: [VertexContract; 2] = [VertexContract::Simple, VertexContract::AtlasAware];

    pub fn name(self) -> &'static str {
        match self {
            VertexContract::Simple => "simple",
            VertexContract::AtlasAware => "atlas-aware",
        }
    }

    pub fn table(self) -> ContractTable<'static> {
        match self {
            VertexContract::Simple => ContractTable {
                name: self.name(),
                attributes: &SIMPLE_ATTRIBUTES,
                forwarded: &SIMPLE_FORWARDED,
                uniforms: &SIMPLE_UNIFORMS,
            },
            VertexContract::AtlasAware => ContractTable {
                name: self.name(),
                attributes: &ATLAS_AWARE_ATTRIBUTES,
                forwarded: &ATLAS_AWARE_FORWARDED,
                uniforms: &ATLAS_AWARE_UNIFORMS,
            },
        }
    }

    pub fn attributes(self) -> &'static [AttributeSlot] {
        self.table().attributes
    }
    pub fn forwarded(self) -> &'static [ForwardedValue] {
        self.table().forwarded
    }
    pub fn uniforms(self) -> &'static [UniformBinding] {
        self.table().uniforms
    }

    pub fn attribute(self, semantic: AttributeSemantic) -> Option<&'static AttributeSlot> {
        self.attributes()
            .iter()
            .find(|slot| slot.semantic == semantic)
    }
    pub fn uniform(self, semantic: UniformSemantic) -> Option<&'static UniformBinding> {
        self.uniforms()
            .iter()
            .find(|binding| binding.semantic == semantic)
    }

    pub fn validate(self) -> Result<(), ContractError> {
        self.table().validate()
    }

    /// Byte offset of an attribute within a tightly packed vertex, attributes laid out in location
    /// order.
    pub fn offset_of(self, semantic: AttributeSemantic) -> Option<u32> {
        self.table().offset_of(semantic)
    }

    pub fn stride(self) -> u32 {
        self.table().stride()
    }

    /// Whether this contract declares everything needed to turn an interpolated UV into an atlas
    /// texture coordinate: UV, region origin, region size and the atlas texture size.
    pub fn supplies_atlas_lookup(self) -> bool {
        self.attribute(AttributeSemantic::Uv).is_some()
            && self.attribute(AttributeSemantic::AtlasOrigin).is_some()
            && self.attribute(AttributeSemantic::AtlasSize).is_some()
            && self.uniform(UniformSemantic::AtlasTextureSize).is_some()
    }
}

impl fmt::Display for VertexContract {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(contract: VertexContract) -> Vec<(u32, AttributeSemantic, ComponentType)> {
        contract
            .attributes()
            .iter()
            .map(|slot| (slot.location, slot.semantic, slot.component_type))
            .collect()
    }

    #[test]
    fn simple_layout() {
        use AttributeSemantic::*;
        assert_eq!(
            layout(VertexContract::Simple),
            vec![
                (0, Position, ComponentType::Vec2),
                (1, Colour, ComponentType::Vec4),
                (2, Uv, ComponentType::Vec2),
                (3, Depth, ComponentType::Float),
            ]
        );
        assert_eq!(VertexContract::Simple.uniforms().len(), 1);
        assert_eq!(
            VertexContract::Simple.uniforms()[0].location,
            UniformLocation::Implicit
        );
        assert_eq!(
            VertexContract::Simple.uniforms()[0].component_type,
            ComponentType::Mat3
        );
    }

    #[test]
    fn atlas_aware_layout() {
        use AttributeSemantic::*;
        assert_eq!(
            layout(VertexContract::AtlasAware),
            vec![
                (0, Position, ComponentType::Vec2),
                (1, Colour, ComponentType::Vec4),
                (2, Uv, ComponentType::Vec2),
                (3, AtlasOrigin, ComponentType::Vec2),
                (4, AtlasSize, ComponentType::Vec2),
                (5, Depth, ComponentType::Float),
            ]
        );
        assert_eq!(VertexContract::AtlasAware.uniforms().len(), 2);
    }

    #[test]
    fn shipped_contracts_validate() {
        for contract in VertexContract::ALL {
            contract.validate().unwrap();
        }
    }

    #[test]
    fn locations_have_no_gaps_or_duplicates() {
        for contract in VertexContract::ALL {
            let locations = contract
                .attributes()
                .iter()
                .map(|slot| slot.location)
                .collect::<BTreeSet<_>>();
            let n = u32::try_from(contract.attributes().len()).unwrap();
            assert_eq!(locations, (0..n).collect());
        }
    }

    #[test]
    fn forwarded_declarations_match_but_are_independent() {
        let simple = VertexContract::Simple.forwarded();
        let atlas = VertexContract::AtlasAware.forwarded();
        assert_eq!(simple, atlas);
        assert!(!std::ptr::eq(simple.as_ptr(), atlas.as_ptr()));
        assert_eq!(simple.len(), 2);
        assert_eq!(
            (simple[0].shader_name, simple[0].component_type),
            ("f_uv", ComponentType::Vec2)
        );
        assert_eq!(
            (simple[1].shader_name, simple[1].component_type),
            ("f_col", ComponentType::Vec4)
        );
    }

    #[test]
    fn atlas_texture_size_is_reserved() {
        let binding = VertexContract::AtlasAware
            .uniform(UniformSemantic::AtlasTextureSize)
            .unwrap();
        assert_eq!(binding.location, UniformLocation::Explicit(34));
        assert_eq!(binding.component_type, ComponentType::Vec2);
        let others = VertexContract::AtlasAware
            .uniforms()
            .iter()
            .filter(|other| other.shader_name != binding.shader_name)
            .filter_map(|other| other.location.explicit())
            .collect_vec();
        assert!(!others.contains(&ATLAS_TEXTURE_SIZE_LOCATION));
        assert!(VertexContract::Simple
            .uniform(UniformSemantic::AtlasTextureSize)
            .is_none());
    }

    #[test]
    fn offsets_and_stride() {
        let simple = VertexContract::Simple;
        assert_eq!(simple.offset_of(AttributeSemantic::Colour), Some(8));
        assert_eq!(simple.offset_of(AttributeSemantic::Depth), Some(32));
        assert_eq!(simple.offset_of(AttributeSemantic::AtlasOrigin), None);
        assert_eq!(simple.stride(), 36);

        let atlas = VertexContract::AtlasAware;
        assert_eq!(atlas.offset_of(AttributeSemantic::AtlasOrigin), Some(32));
        assert_eq!(atlas.offset_of(AttributeSemantic::AtlasSize), Some(40));
        assert_eq!(atlas.offset_of(AttributeSemantic::Depth), Some(48));
        assert_eq!(atlas.stride(), 52);
    }

    #[test]
    fn only_atlas_aware_supplies_atlas_lookup() {
        assert!(VertexContract::AtlasAware.supplies_atlas_lookup());
        assert!(!VertexContract::Simple.supplies_atlas_lookup());
    }

    #[test]
    fn gap_in_locations_is_rejected() {
        let mut attributes = SIMPLE_ATTRIBUTES;
        attributes[2].location = 5;
        let table = ContractTable {
            attributes: &attributes,
            ..VertexContract::Simple.table()
        };
        assert!(matches!(
            table.validate(),
            Err(ContractError::NonContiguousLocation {
                expected: 2,
                found: 5,
                ..
            })
        ));
    }

    #[test]
    fn reused_semantic_is_rejected() {
        let mut attributes = SIMPLE_ATTRIBUTES;
        attributes[3].semantic = AttributeSemantic::Position;
        let table = ContractTable {
            attributes: &attributes,
            ..VertexContract::Simple.table()
        };
        assert!(matches!(
            table.validate(),
            Err(ContractError::DuplicateSemantic { .. })
        ));
    }

    #[test]
    fn mat3_attribute_is_rejected() {
        let mut attributes = SIMPLE_ATTRIBUTES;
        attributes[0].component_type = ComponentType::Mat3;
        let table = ContractTable {
            attributes: &attributes,
            ..VertexContract::Simple.table()
        };
        assert!(matches!(
            table.validate(),
            Err(ContractError::InvalidAttributeType { .. })
        ));
    }

    #[test]
    fn colliding_uniform_locations_are_rejected() {
        let uniforms = [
            UniformBinding {
                location: UniformLocation::Explicit(ATLAS_TEXTURE_SIZE_LOCATION),
                ..ATLAS_AWARE_UNIFORMS[0]
            },
            ATLAS_AWARE_UNIFORMS[1],
        ];
        let table = ContractTable {
            uniforms: &uniforms,
            ..VertexContract::AtlasAware.table()
        };
        assert!(matches!(
            table.validate(),
            Err(ContractError::UniformLocationCollision {
                first: "u_TransMat",
                second: "u_textureSize",
                location: 34,
                ..
            })
        ));
    }

    #[test]
    fn out_of_range_uniform_location_is_rejected() {
        let uniforms = [UniformBinding {
            location: UniformLocation::Explicit(MAX_UNIFORM_LOCATIONS),
            ..ATLAS_AWARE_UNIFORMS[1]
        }];
        let table = ContractTable {
            uniforms: &uniforms,
            ..VertexContract::AtlasAware.table()
        };
        assert!(matches!(
            table.validate(),
            Err(ContractError::LocationOutOfRange { .. })
        ));
    }

    #[test]
    fn forwarded_interface_drift_is_rejected() {
        let forwarded = [SIMPLE_FORWARDED[0]];
        let table = ContractTable {
            forwarded: &forwarded,
            ..VertexContract::Simple.table()
        };
        assert!(matches!(
            table.validate(),
            Err(ContractError::ForwardedMismatch { .. })
        ));
    }

    #[test]
    fn duplicate_shader_name_is_rejected() {
        let mut attributes = SIMPLE_ATTRIBUTES;
        attributes[3].shader_name = "u_TransMat";
        let table = ContractTable {
            attributes: &attributes,
            ..VertexContract::Simple.table()
        };
        assert!(matches!(
            table.validate(),
            Err(ContractError::DuplicateName {
                name: "u_TransMat",
                ..
            })
        ));
    }
}
