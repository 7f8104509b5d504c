use abyssal::{Bindings, Evaluate, Node, ParseError, evaluate, parse};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{debug, info};

/// Abyssal - numeric evaluation of LaTeX math
#[derive(Parser)]
#[command(
    name = "abyssal",
    version,
    about = "Evaluate LaTeX math expressions numerically",
    after_help = r#"
Examples:
  abyssal eval '\frac{1}{2} + x' --var x=3
  abyssal eval '\lim_{x \to 0}{\frac{\sin{x}}{x}}'
  abyssal parse '\int_0^1 x^2 dx' --tree
  abyssal table '\sin{t}' --over t --from 0 --to 3.14159 --steps 4

Environment Variables:
  ABYSSAL_DEBUG=1              Enable debug logging
  ABYSSAL_LOG_LEVEL=debug      Set log level (error, warn, info, debug, trace)
  RUST_LOG=parse=trace         Per-module filters, see env_logger
"#
)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, env = "ABYSSAL_DEBUG")]
    debug: bool,

    /// Set log level
    #[arg(long, value_enum, env = "ABYSSAL_LOG_LEVEL", default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate an expression and print its value
    Eval {
        expression: String,

        /// Bind a variable, e.g. `--var x=2`
        #[arg(short = 'v', long = "var", value_parser = parse_binding)]
        vars: Vec<(String, f64)>,
    },

    /// Parse an expression and print it back as canonical LaTeX
    Parse {
        expression: String,

        /// Print the syntax tree instead
        #[arg(long)]
        tree: bool,
    },

    /// Evaluate an expression at evenly spaced values of one variable
    Table {
        expression: String,

        /// Variable to sweep
        #[arg(long)]
        over: String,

        #[arg(long, allow_negative_numbers = true)]
        from: f64,

        #[arg(long, allow_negative_numbers = true)]
        to: f64,

        /// Number of intervals between `from` and `to`
        #[arg(long, default_value = "10")]
        steps: usize,

        /// Bind another variable, e.g. `--var k=2`
        #[arg(short = 'v', long = "var", value_parser = parse_binding)]
        vars: Vec<(String, f64)>,
    },
}

#[derive(Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn parse_binding(arg: &str) -> Result<(String, f64), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, found '{arg}'"))?;
    let name = name.trim();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(format!("variable names are letters only, found '{name}'"));
    }
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for '{name}': {e}"))?;
    Ok((name.to_string(), value))
}

/// Samples `node` at `steps + 1` evenly spaced values of `variable`.
fn table(
    node: &Node,
    variable: &str,
    from: f64,
    to: f64,
    steps: usize,
    bindings: &Bindings,
) -> Vec<(f64, Result<f64, ParseError>)> {
    let mut bindings = bindings.clone();
    let dx = (to - from) / steps as f64;
    (0..=steps)
        .map(|i| {
            let x = from + i as f64 * dx;
            bindings.insert(variable.to_string(), x);
            (x, node.evaluate(&bindings))
        })
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        log::LevelFilter::Debug
    } else {
        cli.log_level.into()
    };

    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .filter_level(log_level)
        .init();

    info!("abyssal v{} starting", env!("CARGO_PKG_VERSION"));
    debug!("command: {:?}", cli.command);

    match cli.command {
        Command::Eval { expression, vars } => {
            let bindings = vars.into_iter().collect();
            let value = evaluate(&expression, &bindings)
                .with_context(|| format!("failed to evaluate '{expression}'"))?;
            println!("{value}");
        }
        Command::Parse { expression, tree } => {
            let node =
                parse(&expression).with_context(|| format!("failed to parse '{expression}'"))?;
            if tree {
                println!("{node:#?}");
            } else {
                println!("{node}");
            }
        }
        Command::Table {
            expression,
            over,
            from,
            to,
            steps,
            vars,
        } => {
            if steps == 0 {
                bail!("--steps must be at least 1");
            }
            let node =
                parse(&expression).with_context(|| format!("failed to parse '{expression}'"))?;
            let bindings = vars.into_iter().collect();
            for (x, value) in table(&node, &over, from, to, steps, &bindings) {
                match value {
                    Ok(value) => println!("{x}\t{value}"),
                    Err(error) => println!("{x}\terror: {error}"),
                }
            }
        }
    }

    Ok(())
}
