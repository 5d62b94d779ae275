use anyhow::Result;
use clap::Args;

/// Arguments for the show-config command.
#[derive(Args, Debug)]
pub struct ShowConfigArgs {
    /// Config file path
    #[arg(short, long, default_value = "config/Config.toml")]
    pub config: String,

    /// Profile overlay (reads Config.<profile>.toml next to the config file)
    #[arg(long)]
    pub profile: Option<String>,

    /// Parameter override as key=value (repeatable)
    #[arg(short, long = "param")]
    pub params: Vec<String>,
}

/// Prints the resolved configuration as JSON.
pub fn run_show_config(args: ShowConfigArgs) -> Result<()> {
    let config = super::load_config(&args.config, args.profile.as_deref(), &args.params)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
