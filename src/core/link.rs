use crate::core::{
    contract::{ContractTable, VertexContract},
    error::{ContractError, Mismatch},
};
use tracing::warn;
use vulkano::pipeline::graphics::vertex_input::{Vertex, VertexBufferDescription};

/// Checks a producer's vertex buffer layout against a contract: every attribute present by shader
/// name, with the contract's format and packed offset, nothing extra, and the same stride.
pub fn check_layout(
    contract: VertexContract,
    description: &VertexBufferDescription,
) -> Result<(), ContractError> {
    check_table_layout(&contract.table(), description)
}

/// As [`check_layout`], against an arbitrary table.
pub fn check_table_layout(
    table: &ContractTable,
    description: &VertexBufferDescription,
) -> Result<(), ContractError> {
    find_mismatch(table, description).map_or(Ok(()), |mismatch| {
        warn!("{}: vertex layout rejected: {mismatch}", table.name);
        Err(ContractError::BindingMismatch {
            contract: table.name,
            mismatch,
        })
    })
}

/// Checks the layout of vertex type `V` against `contract`.
pub fn link<V: Vertex>(contract: VertexContract) -> Result<(), ContractError> {
    check_layout(contract, &V::per_vertex())
}

fn find_mismatch(table: &ContractTable, description: &VertexBufferDescription) -> Option<Mismatch> {
    let mut expected_offset = 0u64;
    for slot in table.attributes {
        let Some(member) = description.members.get(slot.shader_name) else {
            return Some(Mismatch::MissingAttribute(slot.shader_name.to_string()));
        };
        let Some(expected_format) = slot.component_type.vertex_format() else {
            return Some(Mismatch::NotVertexInput {
                name: slot.shader_name.to_string(),
                ty: slot.component_type,
            });
        };
        if member.format != expected_format || member.num_elements != 1 {
            return Some(Mismatch::Format {
                name: slot.shader_name.to_string(),
                expected: expected_format,
                found: member.format,
            });
        }
        let found_offset = u64::try_from(member.offset).unwrap_or(u64::MAX);
        if found_offset != expected_offset {
            return Some(Mismatch::Offset {
                name: slot.shader_name.to_string(),
                expected: expected_offset,
                found: found_offset,
            });
        }
        expected_offset += u64::from(slot.component_type.size_bytes());
    }
    let mut unexpected = description
        .members
        .keys()
        .filter(|name| {
            !table
                .attributes
                .iter()
                .any(|slot| slot.shader_name == name.as_str())
        })
        .collect::<Vec<_>>();
    unexpected.sort();
    if let Some(name) = unexpected.first() {
        return Some(Mismatch::UnexpectedAttribute((*name).clone()));
    }
    if description.stride != table.stride() {
        return Some(Mismatch::Stride {
            expected: table.stride(),
            found: description.stride,
        });
    }
    None
}
