use crate::{
    backup,
    cli,
    config::{device, Config},
    report,
    secrets::Secrets,
};

pub fn run(config: &Config, secrets: &Secrets, args: cli::run::Cli) -> eyre::Result<()> {
    let devices: Vec<&device::Definition> = match args.device {
        Some(name) => vec![config.device(&device::Name(name))?],
        None => config.devices.iter().collect(),
    };

    let mut outcomes = Vec::with_capacity(devices.len());
    for device in devices {
        outcomes.push(backup::run_device(&config.backup_root, device, secrets));
    }

    report::send(&config.telegram, secrets, &outcomes);
    Ok(())
}

pub fn config(config: &Config) -> eyre::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

pub fn version() -> eyre::Result<()> {
    println!("rosbak: {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}
