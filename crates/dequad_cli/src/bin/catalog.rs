//! Scores the quadrature engine against the reference catalog.
//!
//! Usage:
//!     cargo run --bin dequad-catalog --release -- --digits 15

use clap::Parser;
use dequad_cli::catalog::{run, CatalogArgs};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CatalogArgs::parse();
    println!("{}", run(&args)?);
    Ok(())
}
