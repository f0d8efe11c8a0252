use anyhow::{ensure, Context, Result};

use quadlink::{
    core::{link, prelude::*},
    util::setup_log,
};

fn main() -> Result<()> {
    setup_log()?;

    for contract in VertexContract::ALL {
        contract
            .validate()
            .with_context(|| format!("contract {contract} is malformed"))?;
        info!(
            "{contract}: {} attributes, {} uniforms, stride {} bytes",
            contract.attributes().len(),
            contract.uniforms().len(),
            contract.stride()
        );
        let header = contract.glsl_header();
        ShaderInterface::parse(&header)?
            .conform(contract)
            .with_context(|| format!("emitted header for {contract} does not conform"))?;
        println!("// {contract}\n{header}");
    }

    link::link::<SimpleVertex>(VertexContract::Simple)?;
    link::link::<AtlasVertex>(VertexContract::AtlasAware)?;
    info!("vertex records link against their contracts");

    ensure!(
        link::link::<SimpleVertex>(VertexContract::AtlasAware).is_err(),
        "simple vertex records accepted by the atlas-aware contract"
    );
    ensure!(
        link::link::<AtlasVertex>(VertexContract::Simple).is_err(),
        "atlas vertex records accepted by the simple contract"
    );
    Ok(())
}
