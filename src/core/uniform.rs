use crate::{
    core::{
        contract::{ComponentType, UniformBinding, UniformLocation, UniformSemantic, VertexContract},
        error::ContractError,
    },
    util::linalg::{Mat3x3, Vec2},
};
use std::collections::BTreeMap;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum UniformValue {
    Mat3(Mat3x3),
    Vec2(Vec2),
}

impl UniformValue {
    pub fn component_type(&self) -> ComponentType {
        match self {
            UniformValue::Mat3(_) => ComponentType::Mat3,
            UniformValue::Vec2(_) => ComponentType::Vec2,
        }
    }

    /// The floats as uploaded: column-major for matrices.
    pub fn to_f32s(&self) -> Vec<f32> {
        match self {
            UniformValue::Mat3(m) => m.to_columns().into_iter().flatten().collect(),
            UniformValue::Vec2(v) => v.as_f32().to_vec(),
        }
    }
}

impl From<Mat3x3> for UniformValue {
    fn from(value: Mat3x3) -> Self {
        UniformValue::Mat3(value)
    }
}
impl From<Vec2> for UniformValue {
    fn from(value: Vec2) -> Self {
        UniformValue::Vec2(value)
    }
}

/// The uniform values for one draw against a contract. Setting a uniform the contract does not
/// declare, or with the wrong shape, is an error.
#[derive(Clone, Debug)]
pub struct UniformSet {
    contract: VertexContract,
    values: BTreeMap<UniformSemantic, UniformValue>,
}

impl UniformSet {
    pub fn new(contract: VertexContract) -> Self {
        Self {
            contract,
            values: BTreeMap::new(),
        }
    }

    pub fn contract(&self) -> VertexContract {
        self.contract
    }

    /// Sets a uniform by its shader name.
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<(), ContractError> {
        let binding = self
            .contract
            .uniforms()
            .iter()
            .find(|binding| binding.shader_name == name)
            .ok_or_else(|| ContractError::UniformNotFound(name.to_string()))?;
        self.store(binding, value.into())
    }

    pub fn set_semantic(
        &mut self,
        semantic: UniformSemantic,
        value: impl Into<UniformValue>,
    ) -> Result<(), ContractError> {
        let binding = self
            .contract
            .uniform(semantic)
            .ok_or_else(|| ContractError::UniformNotFound(semantic.to_string()))?;
        self.store(binding, value.into())
    }

    fn store(&mut self, binding: &UniformBinding, value: UniformValue) -> Result<(), ContractError> {
        if value.component_type() != binding.component_type {
            return Err(ContractError::UniformTypeMismatch {
                name: binding.shader_name,
                expected: binding.component_type,
                found: value.component_type(),
            });
        }
        if let (UniformSemantic::AtlasTextureSize, UniformValue::Vec2(size)) =
            (binding.semantic, value)
        {
            // Normalised atlas lookups divide by this.
            if !size.is_finite() || size.x <= 0.0 || size.y <= 0.0 {
                return Err(ContractError::InvalidUniformValue {
                    name: binding.shader_name,
                    reason: format!("atlas size must be positive, got ({}, {})", size.x, size.y),
                });
            }
        }
        self.values.insert(binding.semantic, value);
        Ok(())
    }

    pub fn get(&self, semantic: UniformSemantic) -> Option<UniformValue> {
        self.values.get(&semantic).copied()
    }

    pub fn transform(&self) -> Result<Mat3x3, ContractError> {
        match self.get(UniformSemantic::Transform) {
            Some(UniformValue::Mat3(m)) => Ok(m),
            _ => Err(ContractError::UniformNotSet(self.shader_name(UniformSemantic::Transform))),
        }
    }

    pub fn atlas_texture_size(&self) -> Result<Vec2, ContractError> {
        match self.get(UniformSemantic::AtlasTextureSize) {
            Some(UniformValue::Vec2(v)) => Ok(v),
            _ => Err(ContractError::UniformNotSet(
                self.shader_name(UniformSemantic::AtlasTextureSize),
            )),
        }
    }

    fn shader_name(&self, semantic: UniformSemantic) -> &'static str {
        self.contract
            .uniform(semantic)
            .map_or("<undeclared>", |binding| binding.shader_name)
    }

    pub fn location_of(&self, name: &str) -> Option<UniformLocation> {
        self.contract
            .uniforms()
            .iter()
            .find(|binding| binding.shader_name == name)
            .map(|binding| binding.location)
    }

    /// Shader names of declared uniforms with no value yet.
    pub fn missing(&self) -> Vec<&'static str> {
        self.contract
            .uniforms()
            .iter()
            .filter(|binding| !self.values.contains_key(&binding.semantic))
            .map(|binding| binding.shader_name)
            .collect()
    }

    pub fn require_complete(&self) -> Result<(), ContractError> {
        match self.missing().first().copied() {
            Some(name) => Err(ContractError::UniformNotSet(name)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ATLAS_TEXTURE_SIZE_LOCATION;

    #[test]
    fn set_by_name_and_semantic() {
        let mut uniforms = UniformSet::new(VertexContract::AtlasAware);
        uniforms.set("u_TransMat", Mat3x3::one()).unwrap();
        uniforms
            .set_semantic(
                UniformSemantic::AtlasTextureSize,
                Vec2 { x: 256.0, y: 256.0 },
            )
            .unwrap();
        assert_eq!(uniforms.transform().unwrap(), Mat3x3::one());
        assert_eq!(
            uniforms.atlas_texture_size().unwrap(),
            Vec2 { x: 256.0, y: 256.0 }
        );
        uniforms.require_complete().unwrap();
    }

    #[test]
    fn wrong_shape_is_rejected() {
        let mut uniforms = UniformSet::new(VertexContract::AtlasAware);
        let err = uniforms
            .set("u_textureSize", Mat3x3::one())
            .unwrap_err();
        assert!(matches!(
            err,
            ContractError::UniformTypeMismatch {
                name: "u_textureSize",
                expected: ComponentType::Vec2,
                found: ComponentType::Mat3,
            }
        ));
        assert!(uniforms.get(UniformSemantic::AtlasTextureSize).is_none());
    }

    #[test]
    fn undeclared_uniform_is_rejected() {
        let mut uniforms = UniformSet::new(VertexContract::Simple);
        assert!(matches!(
            uniforms.set("u_textureSize", Vec2::one()),
            Err(ContractError::UniformNotFound(_))
        ));
        assert!(matches!(
            uniforms.set_semantic(UniformSemantic::AtlasTextureSize, Vec2::one()),
            Err(ContractError::UniformNotFound(_))
        ));
    }

    #[test]
    fn missing_uniforms_are_reported() {
        let mut uniforms = UniformSet::new(VertexContract::AtlasAware);
        assert_eq!(uniforms.missing(), vec!["u_TransMat", "u_textureSize"]);
        uniforms.set("u_TransMat", Mat3x3::one()).unwrap();
        assert!(matches!(
            uniforms.require_complete(),
            Err(ContractError::UniformNotSet("u_textureSize"))
        ));
        assert!(matches!(
            uniforms.atlas_texture_size(),
            Err(ContractError::UniformNotSet("u_textureSize"))
        ));
    }

    #[test]
    fn locations() {
        let uniforms = UniformSet::new(VertexContract::AtlasAware);
        assert_eq!(
            uniforms.location_of("u_textureSize"),
            Some(UniformLocation::Explicit(ATLAS_TEXTURE_SIZE_LOCATION))
        );
        assert_eq!(
            uniforms.location_of("u_TransMat"),
            Some(UniformLocation::Implicit)
        );
        assert_eq!(uniforms.location_of("u_missing"), None);
    }

    #[test]
    fn upload_order_is_column_major() {
        let value = UniformValue::from(Mat3x3::translation(2.0, 3.0));
        assert_eq!(
            value.to_f32s(),
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 2.0, 3.0, 1.0]
        );
        assert_eq!(UniformValue::from(Vec2::one()).to_f32s(), vec![1.0, 1.0]);
    }

    #[test]
    fn non_positive_atlas_size_is_rejected() {
        let mut uniforms = UniformSet::new(VertexContract::AtlasAware);
        for size in [
            Vec2 { x: 0.0, y: 0.0 },
            Vec2 { x: 256.0, y: -1.0 },
            Vec2 {
                x: f32::NAN,
                y: 256.0,
            },
        ] {
            assert!(matches!(
                uniforms.set("u_textureSize", size),
                Err(ContractError::InvalidUniformValue {
                    name: "u_textureSize",
                    ..
                })
            ));
        }
        assert!(uniforms.get(UniformSemantic::AtlasTextureSize).is_none());
        uniforms
            .set("u_textureSize", Vec2 { x: 1.0, y: 512.0 })
            .unwrap();
    }
}
