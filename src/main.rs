use clap::{ArgAction, Parser, Subcommand};
use sccrypt::advice::advise;
use sccrypt::pipeline::{self, DecryptOptions, EncryptOptions, FrameProgress};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "sccrypt", version, about = "Chunked AES file encryption into .scc containers")]
struct Cli {
    /// Log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file into a .scc container
    Encrypt {
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory (defaults to the input's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, env = "SCCRYPT_PASSWORD", hide_env_values = true)]
        password: String,
        /// Give the container a random file name
        #[arg(long)]
        obfuscate: bool,
        /// Store the original file name encrypted
        #[arg(short, long)]
        secret: bool,
        /// Overwrite an existing destination
        #[arg(short, long)]
        force: bool,
        /// Print password strength advice before encrypting
        #[arg(short, long)]
        advice: bool,
    },
    /// Decrypt a .scc container
    Decrypt {
        #[arg(short, long)]
        input: PathBuf,
        /// Output directory (defaults to the container's directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(short, long, env = "SCCRYPT_PASSWORD", hide_env_values = true)]
        password: String,
        /// Overwrite an existing destination
        #[arg(short, long)]
        force: bool,
    },
    /// Show container header fields
    Info {
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {

        // ── Encrypt ──────────────────────────────────────────────────────────
        Commands::Encrypt { input, output, password, obfuscate, secret, force, advice } => {
            check_inputs(&input, &password)?;
            if advice {
                println!("[advice] {}", advise(&password));
            }
            let opts = EncryptOptions {
                output_dir: output,
                password,
                obfuscate,
                secret,
                overwrite: force,
            };
            let mut progress = print_progress;
            let report = pipeline::encrypt(&input, &opts, &mut rand::thread_rng(), Some(&mut progress))?;
            println!("Encrypted {} -> {} ({} frames)", input.display(), report.destination.display(), report.frames);
        }

        // ── Decrypt ──────────────────────────────────────────────────────────
        Commands::Decrypt { input, output, password, force } => {
            check_inputs(&input, &password)?;
            let opts = DecryptOptions { output_dir: output, password, overwrite: force };
            let mut progress = print_progress;
            let report = pipeline::decrypt(&input, &opts, Some(&mut progress))?;
            println!("Decrypted {} -> {} ({} bytes)", input.display(), report.destination.display(), report.bytes);
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input } => {
            let info = pipeline::inspect(&input)?;
            println!("── .scc container ───────────────────────────────────────");
            println!("  Path           {}", input.display());
            println!("  Size           {} B", info.container_size);
            println!("  Frames         {}", info.frames);
            println!("  Secret name    {}", info.secret);
            println!("  Name           {}", info.name.as_deref().unwrap_or("(encrypted)"));
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn check_inputs(input: &Path, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !input.is_file() {
        return Err(format!("input file is missing: {}", input.display()).into());
    }
    if password.is_empty() {
        return Err("password is required".into());
    }
    Ok(())
}

fn print_progress(p: FrameProgress) {
    println!("frame {}/{} ({} bytes)", p.index, p.total, p.bytes);
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::EnvFilter;

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
