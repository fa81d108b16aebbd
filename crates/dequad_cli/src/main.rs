use clap::Parser;
use dequad_cli::integrate::{run, Args};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    println!("{}", run(&args)?);
    Ok(())
}
