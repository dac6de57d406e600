use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;

use rev_repository::Repository;
use rev_spec::{resolve_ext, ResolveError};

/// Resolve revision expressions to object ids.
#[derive(Parser)]
#[command(name = "revr", about = "Resolve a revision expression to an object id")]
pub struct Cli {
    /// The revision expression to resolve (e.g. "HEAD~2", "master@{u}")
    spec: String,

    /// Set the path to the git directory (discovered from the current
    /// directory when omitted)
    #[arg(long = "git-dir")]
    git_dir: Option<PathBuf>,

    /// Also print the reference the expression was anchored to
    #[arg(long)]
    symbolic: bool,
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("fatal: {e}");
            process::exit(128);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    let repo = match &cli.git_dir {
        Some(dir) => Repository::open(dir)?,
        None => Repository::discover(".")?,
    };

    match resolve_ext(&repo, &cli.spec) {
        Ok((oid, reference)) => {
            println!("{}", oid.to_hex());
            if cli.symbolic {
                if let Some(name) = reference {
                    println!("{}", name);
                }
            }
            Ok(0)
        }
        Err(e @ ResolveError::Invalid(_)) => {
            eprintln!("fatal: {e}");
            Ok(129)
        }
        Err(e) => {
            eprintln!("fatal: {e}");
            Ok(1)
        }
    }
}
