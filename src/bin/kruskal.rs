//! Distributed MST driver.
//!
//! Built with `mpi-support` and launched under `mpirun`, every MPI process is
//! one rank. Otherwise `--ranks N` runs an in-process group with one thread
//! per rank, and the default of one rank is the plain serial program.

use clap::Parser;
use kruskal_hypercube::config::{DEFAULT_SORT_WORKERS, MstConfig, validate_group_size};
use kruskal_hypercube::prelude::*;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Graph in the binary format produced by `kruskal-convert`.
    input: PathBuf,

    /// Ranks of the in-process group. Ignored under MPI.
    #[clap(long, default_value_t = 1)]
    ranks: usize,

    /// Threads per rank used by the edge sort.
    #[clap(long, default_value_t = DEFAULT_SORT_WORKERS)]
    sort_workers: usize,

    /// Print parse, communication and processing time of every rank.
    #[clap(long, short)]
    verbose: bool,
}

fn open_input(path: &Path) -> Result<BufReader<File>, MstError> {
    Ok(BufReader::new(File::open(path)?))
}

/// Print what `rank` has to say about its run. Returns `false` on error.
fn report(rank: usize, result: &Result<RankOutcome, MstError>, verbose: bool) -> bool {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("{rank}: {err}");
            return false;
        }
    };
    if verbose {
        let t = outcome.timings();
        println!("{rank}: Parse time: {:.3}s", t.parse.as_secs_f64());
        println!("{rank}: Comm time: {:.3}s", t.comm.as_secs_f64());
        println!("{rank}: Proc time: {:.3}s", t.proc.as_secs_f64());
    }
    if let Some(r) = outcome.report() {
        println!("MST length: {}", r.weight);
        println!("Total Time {:.3}s", r.timings.total().as_secs_f64());
        println!("Without I/O {:.3}s", r.timings.without_io().as_secs_f64());
    }
    true
}

#[cfg(not(feature = "mpi-support"))]
fn launch(args: &Args, config: &MstConfig) -> ExitCode {
    if let Err(err) = validate_group_size(args.ranks) {
        eprintln!("0: {err}");
        return ExitCode::FAILURE;
    }
    if args.ranks == 1 {
        let result = distributed_mst(&NoComm, config, || open_input(&args.input));
        return if report(0, &result, config.verbose) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    let results: Vec<_> = std::thread::scope(|s| {
        let handles: Vec<_> = RayonComm::group(args.ranks)
            .into_iter()
            .map(|comm| {
                s.spawn(move || distributed_mst(&comm, config, || open_input(&args.input)))
            })
            .collect();
        handles.into_iter().map(|h| h.join()).collect()
    });

    let mut ok = true;
    for (rank, joined) in results.into_iter().enumerate() {
        match joined {
            Ok(result) => ok &= report(rank, &result, config.verbose),
            Err(_) => {
                eprintln!("{rank}: rank thread panicked");
                ok = false;
            }
        }
    }
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

#[cfg(feature = "mpi-support")]
fn launch(args: &Args, config: &MstConfig) -> ExitCode {
    let comm = match MpiComm::new() {
        Ok(comm) => comm,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    if args.ranks != 1 {
        log::warn!(
            "--ranks {} ignored: the MPI job has {} ranks",
            args.ranks,
            comm.size()
        );
    }
    // Fail before any I/O on a bad group; every rank sees the same size.
    if let Err(err) = validate_group_size(comm.size()) {
        eprintln!("{}: {err}", comm.rank());
        return ExitCode::FAILURE;
    }

    let result = distributed_mst(&comm, config, || open_input(&args.input));
    // Loading failures were agreed on by every rank; a failed transfer was
    // not, and peers may be blocked on it.
    if let Err(err @ MstError::CommError { .. }) = &result {
        eprintln!("{}: {err}", comm.rank());
        comm.abort(1);
    }
    let ok = report(comm.rank(), &result, config.verbose);
    comm.barrier();
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    log::debug!("Running with args: {:#?}", args);
    let config = MstConfig {
        sort_workers: args.sort_workers,
        verbose: args.verbose,
        ..MstConfig::default()
    };
    launch(&args, &config)
}
