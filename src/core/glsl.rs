use crate::core::{
    contract::{ComponentType, UniformLocation, VertexContract},
    error::{ContractError, Mismatch},
};
use std::{fmt, fmt::Write};
use tracing::warn;

impl VertexContract {
    /// The GLSL declarations for this contract: attribute inputs, forwarded outputs, then uniforms,
    /// each group followed by a blank line except the last.
    pub fn glsl_header(self) -> String {
        let mut rv = String::new();
        for slot in self.attributes() {
            let _ = writeln!(
                rv,
                "layout(location = {}) in {} {};",
                slot.location, slot.component_type, slot.shader_name
            );
        }
        rv.push('\n');
        for value in self.forwarded() {
            let _ = writeln!(rv, "out {} {};", value.component_type, value.shader_name);
        }
        rv.push('\n');
        for binding in self.uniforms() {
            if let UniformLocation::Explicit(location) = binding.location {
                let _ = write!(rv, "layout(location = {location}) ");
            }
            let _ = writeln!(rv, "uniform {} {};", binding.component_type, binding.shader_name);
        }
        rv
    }
}

/// A declared type. Types outside the contracts' vocabulary (samplers, `vec3`, `mat4`...) are kept
/// by name so `conform` can report them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GlslType {
    Component(ComponentType),
    Other(String),
}

impl GlslType {
    fn from_name(name: &str) -> Self {
        ComponentType::from_glsl_name(name)
            .map_or_else(|| GlslType::Other(name.to_string()), GlslType::Component)
    }
}

impl fmt::Display for GlslType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlslType::Component(ty) => write!(f, "{ty}"),
            GlslType::Other(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub location: Option<u32>,
    pub ty: GlslType,
    pub name: String,
    /// 1-based line of the declaration in the parsed source.
    pub line: usize,
}

/// The `in`, `out` and `uniform` declarations of a vertex shader.
///
/// Only plain declarations are understood; uniform blocks and function bodies are skipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShaderInterface {
    pub inputs: Vec<Declaration>,
    pub outputs: Vec<Declaration>,
    pub uniforms: Vec<Declaration>,
}

enum Storage {
    In,
    Out,
    Uniform,
}

impl ShaderInterface {
    pub fn parse(src: &str) -> Result<Self, ContractError> {
        let cleaned = strip_comments(src);
        let mut rv = ShaderInterface::default();
        let mut start = 0;
        for (end, _) in cleaned.match_indices(';') {
            let raw = &cleaned[start..end];
            let body_start = raw.rfind(['{', '}']).map_or(0, |i| i + 1);
            let statement = &raw[body_start..];
            let leading = statement.len() - statement.trim_start().len();
            let line = 1 + cleaned[..start + body_start + leading].matches('\n').count();
            start = end + 1;
            if let Some((storage, decl)) = parse_statement(statement.trim(), line)? {
                match storage {
                    Storage::In => rv.inputs.push(decl),
                    Storage::Out => rv.outputs.push(decl),
                    Storage::Uniform => rv.uniforms.push(decl),
                }
            }
        }
        Ok(rv)
    }

    /// Checks this shader against the interface of `contract`, as a linker would. Inputs and
    /// outputs must match exactly. Uniforms the contract does not declare are allowed, as long as
    /// they stay off the contract's explicit locations.
    pub fn conform(&self, contract: VertexContract) -> Result<(), ContractError> {
        self.find_mismatch(contract).map_or(Ok(()), |mismatch| {
            warn!("{contract}: shader interface rejected: {mismatch}");
            Err(ContractError::BindingMismatch {
                contract: contract.name(),
                mismatch,
            })
        })
    }

    fn find_mismatch(&self, contract: VertexContract) -> Option<Mismatch> {
        for slot in contract.attributes() {
            let Some(decl) = find(&self.inputs, slot.shader_name) else {
                return Some(Mismatch::MissingAttribute(slot.shader_name.to_string()));
            };
            if decl.location != Some(slot.location) {
                return Some(Mismatch::Location {
                    name: decl.name.clone(),
                    expected: Some(slot.location),
                    found: decl.location,
                });
            }
            if let Some(mismatch) = type_mismatch(decl, slot.component_type) {
                return Some(mismatch);
            }
        }
        if let Some(decl) = self.inputs.iter().find(|decl| {
            !contract
                .attributes()
                .iter()
                .any(|slot| slot.shader_name == decl.name)
        }) {
            return Some(Mismatch::UnexpectedAttribute(decl.name.clone()));
        }

        for value in contract.forwarded() {
            let Some(decl) = find(&self.outputs, value.shader_name) else {
                return Some(Mismatch::MissingOutput(value.shader_name.to_string()));
            };
            if let Some(mismatch) = type_mismatch(decl, value.component_type) {
                return Some(mismatch);
            }
        }
        if let Some(decl) = self.outputs.iter().find(|decl| {
            !contract
                .forwarded()
                .iter()
                .any(|value| value.shader_name == decl.name)
        }) {
            return Some(Mismatch::UnexpectedOutput(decl.name.clone()));
        }

        for binding in contract.uniforms() {
            let Some(decl) = find(&self.uniforms, binding.shader_name) else {
                return Some(Mismatch::MissingUniform(binding.shader_name.to_string()));
            };
            if decl.location != binding.location.explicit() {
                return Some(Mismatch::Location {
                    name: decl.name.clone(),
                    expected: binding.location.explicit(),
                    found: decl.location,
                });
            }
            if let Some(mismatch) = type_mismatch(decl, binding.component_type) {
                return Some(mismatch);
            }
        }
        self.uniforms
            .iter()
            .filter(|decl| {
                !contract
                    .uniforms()
                    .iter()
                    .any(|binding| binding.shader_name == decl.name)
            })
            .find_map(|decl| {
                let location = decl.location?;
                contract
                    .uniforms()
                    .iter()
                    .find(|binding| binding.location.explicit() == Some(location))
                    .map(|binding| Mismatch::ReservedLocation {
                        name: decl.name.clone(),
                        location,
                        reserved_by: binding.shader_name,
                    })
            })
    }
}

fn type_mismatch(decl: &Declaration, expected: ComponentType) -> Option<Mismatch> {
    (decl.ty != GlslType::Component(expected)).then(|| Mismatch::Type {
        name: decl.name.clone(),
        expected,
        found: decl.ty.to_string(),
    })
}

fn is_identifier(token: &str) -> bool {
    token.starts_with(|c: char| c.is_ascii_alphabetic() || c == '_')
        && token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn find<'a>(decls: &'a [Declaration], name: &str) -> Option<&'a Declaration> {
    decls.iter().find(|decl| decl.name == name)
}

/// Blanks out comments and preprocessor lines, keeping newlines so line numbers survive.
fn strip_comments(src: &str) -> String {
    let mut rv = String::with_capacity(src.len());
    let mut in_block = false;
    for line in src.split_inclusive('\n') {
        if !in_block && line.trim_start().starts_with('#') {
            rv.extend(line.chars().map(|c| if c == '\n' { '\n' } else { ' ' }));
            continue;
        }
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            if in_block {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    in_block = false;
                    rv.push_str("  ");
                } else {
                    rv.push(if c == '\n' { '\n' } else { ' ' });
                }
            } else if c == '/' && chars.peek() == Some(&'/') {
                if line.ends_with('\n') {
                    rv.push('\n');
                }
                break;
            } else if c == '/' && chars.peek() == Some(&'*') {
                chars.next();
                in_block = true;
                rv.push_str("  ");
            } else {
                rv.push(c);
            }
        }
    }
    rv
}

fn glsl_error(line: usize, reason: impl Into<String>) -> ContractError {
    ContractError::Glsl {
        line,
        reason: reason.into(),
    }
}

fn parse_statement(
    statement: &str,
    line: usize,
) -> Result<Option<(Storage, Declaration)>, ContractError> {
    let (location, rest) = if let Some(after) = statement.strip_prefix("layout") {
        let after = after.trim_start();
        let Some(inner) = after.strip_prefix('(') else {
            return Err(glsl_error(line, "expected `(` after `layout`"));
        };
        let Some(close) = inner.find(')') else {
            return Err(glsl_error(line, "unterminated layout qualifier"));
        };
        (parse_layout(&inner[..close], line)?, &inner[close + 1..])
    } else {
        (None, statement)
    };

    let mut tokens = rest
        .split_whitespace()
        .skip_while(|token| matches!(*token, "flat" | "smooth" | "noperspective"));
    let storage = match tokens.next() {
        Some("in") => Storage::In,
        Some("out") => Storage::Out,
        Some("uniform") => Storage::Uniform,
        _ if location.is_some() => {
            return Err(glsl_error(line, "layout qualifier without a declaration"));
        }
        _ => return Ok(None),
    };
    let Some(type_name) = tokens.next() else {
        return Err(glsl_error(line, "missing type"));
    };
    if !is_identifier(type_name) {
        return Err(glsl_error(line, format!("invalid type `{type_name}`")));
    }
    let Some(name) = tokens.next() else {
        return Err(glsl_error(line, "missing name"));
    };
    if !is_identifier(name) {
        return Err(glsl_error(line, format!("invalid name `{name}`")));
    }
    if let Some(extra) = tokens.next() {
        return Err(glsl_error(line, format!("unexpected `{extra}`")));
    }
    Ok(Some((
        storage,
        Declaration {
            location,
            ty: GlslType::from_name(type_name),
            name: name.to_string(),
            line,
        },
    )))
}

fn parse_layout(qualifiers: &str, line: usize) -> Result<Option<u32>, ContractError> {
    let mut rv = None;
    for qualifier in qualifiers.split(',') {
        let Some((key, value)) = qualifier.split_once('=') else {
            continue;
        };
        if key.trim() == "location" {
            let value = value.trim();
            rv = Some(
                value
                    .parse::<u32>()
                    .map_err(|_| glsl_error(line, format!("invalid location `{value}`")))?,
            );
        }
    }
    Ok(rv)
}
