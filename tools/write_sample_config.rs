//! Print or write a sample GamblePro client configuration

use clap::Parser;
use gamblepro::config::{generate_sample_config, ClientConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gamblepro-config")]
#[command(about = "Generate a sample gamblepro.toml", long_about = None)]
struct Args {
    /// Destination file; prints to stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let sample = generate_sample_config();

    // Fail before writing anything the client itself would reject
    let parsed: ClientConfig = toml::from_str(&sample)?;
    parsed.validate()?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, sample)?;
            println!("✅ Wrote {}", path.display());
        }
        None => print!("{}", sample),
    }
    Ok(())
}
