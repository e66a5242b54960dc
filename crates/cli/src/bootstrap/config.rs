use ferrous_flatten_domain::{CliOverrides, Config};
use tracing::info;

pub fn load_config(
    config_path: Option<&str>,
    cli_overrides: CliOverrides,
) -> anyhow::Result<Config> {
    let config = Config::load(config_path, cli_overrides)?;
    config.validate()?;

    info!(
        config_file = config_path.unwrap_or("default"),
        dns_port = config.server.dns_port,
        bind = %config.server.bind_address,
        max_depth = config.flattening.max_depth,
        flattening_upstreams = config.flattening.upstreams.len(),
        pipeline_upstreams = config.pipeline.upstreams.len(),
        "Configuration loaded"
    );

    Ok(config)
}
