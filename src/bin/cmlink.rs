//! Minimal CLI: compare two covariance models and print the Link result.
//!
//! Usage:
//!   cmlink <cm1.json> <cm2.json> [--fast-ins] [--algebra <name>]
//!          [--root1 <id>] [--root2 <id>]
//!
//! `--algebra` accepts `score`, `rna`, `bracket`, `nodes`, `extended`,
//! `score+rna+bracket`, or `score+rna+bracket+nodes` (default: `score`).

use std::env;

use cmlink::cmfile;
use cmlink::driver::{self, AlgebraSelector, RootOverride};

fn parse_flag(args: &[String], key: &str) -> Option<String> {
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            return it.next().cloned();
        }
    }
    None
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "cmlink=info".into()))
        .with_target(false)
        .compact()
        .init();

    let args: Vec<String> = env::args().collect();
    let positional: Vec<&str> = args.iter().skip(1).map(String::as_str).filter(|a| !a.starts_with("--")).collect();

    if positional.len() < 2 {
        return Err(anyhow::anyhow!(
            "usage: cmlink <cm1.json> <cm2.json> [--fast-ins] [--algebra <name>] [--root1 <id>] [--root2 <id>]"
        ));
    }
    let path1 = positional[0];
    let path2 = positional[1];

    let fast_ins = has_flag(&args, "--fast-ins");

    let algebra_str = parse_flag(&args, "--algebra").unwrap_or_else(|| "score".to_string());
    let selector: AlgebraSelector = algebra_str
        .parse()
        .map_err(|e: String| anyhow::anyhow!("invalid --algebra: {e}"))?;

    let root1 = parse_flag(&args, "--root1").and_then(|s| s.parse().ok());
    let root2 = parse_flag(&args, "--root2").and_then(|s| s.parse().ok());

    let cm1 = cmfile::load(path1).map_err(|e| anyhow::anyhow!("loading {path1}: {e}"))?;
    let cm2 = cmfile::load(path2).map_err(|e| anyhow::anyhow!("loading {path2}: {e}"))?;

    tracing::info!(cm1 = %cm1.name, cm2 = %cm2.name, fast_ins, algebra = %algebra_str, "starting comparison");

    let output = driver::compare(&cm1, &cm2, selector, fast_ins, RootOverride { root1, root2 });
    println!("{output}");

    Ok(())
}
