//! Simple command that prints one or '-n count' UUIDv7 strings, with an optional
//! throughput benchmark mode.

use std::{env, io, io::Write, process::ExitCode, time::Instant};

struct Options {
    count: usize,
    benchmark: bool,
}

fn main() -> io::Result<ExitCode> {
    let options = {
        let mut args = env::args();
        let program = args.next();
        match parse_args(args) {
            Ok(options) => options,
            Err(message) => {
                eprintln!("Error: {}", message);
                eprintln!(
                    "Usage: {} [-n count] [--benchmark]",
                    program.as_deref().unwrap_or("uuid7-mono")
                );
                return Ok(ExitCode::FAILURE);
            }
        }
    };

    if options.benchmark {
        run_benchmark();
        return Ok(ExitCode::SUCCESS);
    }

    let mut buf = io::BufWriter::new(io::stdout());
    for _ in 0..options.count {
        writeln!(buf, "{}", uuid7_mono::uuid7())?;
    }

    Ok(ExitCode::SUCCESS)
}

fn run_benchmark() {
    const N: u64 = 2_000_000;

    // warm up the lazily initialized global generator
    std::hint::black_box(uuid7_mono::uuid7());

    let start = Instant::now();
    for _ in 0..N {
        std::hint::black_box(uuid7_mono::uuid7());
    }
    let elapsed = start.elapsed();

    let ns_per_call = elapsed.as_nanos() / u128::from(N);
    println!(
        "generated {} UUIDs in {:?} ({} ns per call, {:.0} per second)",
        N,
        elapsed,
        ns_per_call,
        f64::from(1_000_000_000u32) / ns_per_call as f64,
    );
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Options, String> {
    let mut count = None;
    let mut benchmark = false;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--benchmark" => {
                benchmark = true;
            }
            "-n" => {
                if count.is_some() {
                    return Err("option 'n' given more than once".to_owned());
                }
                let Some(n_arg) = args.next() else {
                    return Err("argument to option 'n' missing".to_owned());
                };
                let Ok(c) = n_arg.parse() else {
                    return Err(format!("invalid argument to option 'n': '{}'", n_arg));
                };
                count.replace(c);
            }
            _ => return Err(format!("unrecognized argument '{}'", arg)),
        }
    }
    Ok(Options {
        count: count.unwrap_or(1),
        benchmark,
    })
}
