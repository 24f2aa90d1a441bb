// Copyright (c) 2017-2021 Fabian Schuiki

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use anyhow::{Context, Result};
use clap::Arg;
use std::{
    fs::File,
    io::{Read, Write},
};
use wgslopt::{ConstCondElim, LoopUnroll, Pass, PassContext};

fn main() {
    match main_inner() {
        Ok(_) => (),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn main_inner() -> Result<()> {
    let matches = app_from_crate!()
        .about("Specializes WGSL shader source.")
        .arg(
            Arg::with_name("verbosity")
                .short("v")
                .multiple(true)
                .help(HELP_VERBOSITY.lines().next().unwrap())
                .long_help(HELP_VERBOSITY),
        )
        .arg(
            Arg::with_name("input")
                .help("Shader file to transform")
                .required(true),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("File to write output to; stdout if omitted"),
        )
        .arg(
            Arg::with_name("time-passes")
                .short("t")
                .long("time")
                .help("Print execution time statistics per pass"),
        )
        .arg(
            Arg::with_name("threshold")
                .long("threshold")
                .value_name("COUNT")
                .takes_value(true)
                .help("Largest iteration count that still gets unrolled"),
        )
        .arg(
            Arg::with_name("passes")
                .short("p")
                .long("pass")
                .value_name("PASS")
                .takes_value(true)
                .multiple(true)
                .help(HELP_PASSES.lines().next().unwrap())
                .long_help(HELP_PASSES),
        )
        .get_matches();

    // Configure the logger.
    let verbose = std::cmp::max(1, matches.occurrences_of("verbosity") as usize) - 1;
    let quiet = !matches.is_present("verbosity");
    stderrlog::new()
        .module("wgslopt")
        .quiet(quiet)
        .verbosity(verbose)
        .init()
        .unwrap();

    // Assemble the pass configuration.
    let mut ctx = PassContext::default();
    if let Some(threshold) = matches.value_of("threshold") {
        ctx.threshold = threshold
            .parse()
            .with_context(|| format!("invalid threshold `{}`", threshold))?;
    }

    // Prepare the time tracking.
    let mut times = vec![];
    let tinit = time::precise_time_ns();

    // Read the input.
    let t0 = time::precise_time_ns();
    let mut code = String::new();
    {
        let path = matches.value_of("input").unwrap();
        let mut input = File::open(path).with_context(|| format!("cannot open `{}`", path))?;
        input
            .read_to_string(&mut code)
            .with_context(|| format!("cannot read `{}`", path))?;
    }
    let t1 = time::precise_time_ns();
    times.push(("read".to_owned(), t1 - t0));

    // Determine the passes to be run.
    let passes: Vec<_> = if let Some(passes) = matches.values_of("passes") {
        passes.collect()
    } else {
        vec!["unroll", "condelim"]
    };

    // Apply the passes.
    debug!("Running {:?}", passes);
    for &pass in &passes {
        trace!("Running pass {}", pass);
        let t0 = time::precise_time_ns();
        code = match pass {
            "unroll" => LoopUnroll::run_on_source(&ctx, &code)?,
            "condelim" => ConstCondElim::run_on_source(&ctx, &code)?,
            _ => {
                error!("Unknown pass `{}`", pass);
                continue;
            }
        };
        let t1 = time::precise_time_ns();
        times.push((pass.to_owned(), t1 - t0));
    }

    // Write the output.
    let t0 = time::precise_time_ns();
    if let Some(path) = matches.value_of("output") {
        let mut output = File::create(path).with_context(|| format!("cannot create `{}`", path))?;
        output
            .write_all(code.as_bytes())
            .with_context(|| format!("cannot write `{}`", path))?;
    } else {
        print!("{}", code);
    }
    let t1 = time::precise_time_ns();
    times.push(("output".to_owned(), t1 - t0));

    // Final time stat.
    let tfinal = time::precise_time_ns();
    times.push(("total".to_owned(), tfinal - tinit));

    // Print execution time statistics if requested by the user.
    if matches.is_present("time-passes") {
        eprintln!("Execution Time Statistics:");
        for (mut name, ns) in times {
            name.push(':');
            eprintln!("  {:10}  {:8.3} ms", name, ns as f64 * 1.0e-6);
        }
    }

    Ok(())
}

static HELP_VERBOSITY: &str = "Increase message verbosity

This option can be specified multiple times to increase the level of verbosity \
in the output:

-v      Only print errors
-vv     Also print warnings
-vvv    Also print info messages
-vvvv   Also print debug messages
-vvvvv  Also print detailed tracing messages
";

static HELP_PASSES: &str = "Exact order of passes to run

This option specifies the exact order of passes to be executed. The admissible \
passes are as follows:

unroll      Loop Unrolling
condelim    Constant Conditional Elimination
";
