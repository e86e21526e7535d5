//! Convert a whitespace-separated text graph into the binary input format.

use clap::Parser;
use kruskal_hypercube::io::ascii::convert_ascii;
use kruskal_hypercube::prelude::*;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Text graph: `n_verts n_edges`, then `u v weight` per edge.
    input: PathBuf,

    /// Where to write the binary graph.
    output: PathBuf,
}

fn convert(args: &Args) -> Result<GraphHeader, MstError> {
    let input = BufReader::new(File::open(&args.input)?);
    let output = File::create(&args.output)?;
    convert_ascii(input, output)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    match convert(&args) {
        Ok(_) => {
            println!("* Done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("* {}: {err}", args.input.display());
            ExitCode::FAILURE
        }
    }
}
