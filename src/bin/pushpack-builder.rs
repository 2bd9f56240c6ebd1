//! Pushpack builder binary

use clap::Parser;
use pushpack::exit_codes::{EXIT_PANIC, EXIT_SUCCESS, exit_code_for};
use pushpack::{BuildOptions, build_push_package};
use std::{panic, path::PathBuf, process};

const VERSION: &str = pushpack::version::VERSION;

#[derive(Parser, Debug)]
#[command(version = VERSION, about = "Build signed web push packages")]
struct Args {
    /// Recipient identifier substituted into the package document
    #[arg(short, long)]
    recipient: String,

    /// Correlation identifier carried through to delivery
    #[arg(short, long)]
    correlation: String,

    /// Directory holding the template files
    #[arg(short, long)]
    template_dir: PathBuf,

    /// Issuer certificate (PEM)
    #[arg(long)]
    certificate: PathBuf,

    /// Issuer private key (PEM)
    #[arg(long)]
    private_key: PathBuf,

    /// Passphrase for the private key
    #[arg(long)]
    key_passphrase: Option<String>,

    /// Intermediate certificate for chain building (PEM)
    #[arg(long)]
    intermediate: Option<PathBuf>,

    /// Base directory for working directories (defaults to the system
    /// temp directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Primary delivery host
    #[arg(long)]
    host: String,

    /// Base delivery domain, repeatable; defaults to the host
    #[arg(long = "push-domain")]
    push_domains: Vec<String>,

    /// Display name shown to the recipient
    #[arg(long, default_value = "")]
    website_name: String,

    /// Push-service identifier
    #[arg(long, default_value = "")]
    website_push_id: String,

    /// Delivery-service host; defaults to the host
    #[arg(long)]
    web_service_host: Option<String>,

    /// Skip verification after building
    #[arg(long)]
    skip_verification: bool,

    /// Log level (trace, debug, info, warn, error, or json:<level>)
    #[arg(long)]
    log_level: Option<String>,
}

fn main() {
    // Return a dedicated exit code on panic instead of the default 101 abort path
    panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {panic_info}");
        process::exit(EXIT_PANIC);
    }));

    let result = panic::catch_unwind(run);

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(_) => {
            eprintln!("Fatal: Unhandled panic in builder");
            process::exit(EXIT_PANIC);
        }
    }
}

fn run() -> i32 {
    let args = Args::parse();

    if let Some(ref level) = args.log_level {
        pushpack::logger::JsonLogger::init_with_level(level);
    } else {
        pushpack::logger::JsonLogger::init();
    }

    let options = BuildOptions {
        certificate_path: args.certificate,
        private_key_path: args.private_key,
        key_passphrase: args.key_passphrase,
        intermediate_path: args.intermediate,
        template_dir: args.template_dir,
        output_dir: args.output_dir,
        host: args.host,
        push_domains: args.push_domains,
        website_name: args.website_name,
        website_push_id: args.website_push_id,
        web_service_host: args.web_service_host,
        skip_verification: args.skip_verification,
    };

    match build_push_package(&args.recipient, &args.correlation, &options) {
        Ok(receipt) => {
            println!("{}", receipt.archive.path.display());
            EXIT_SUCCESS
        }
        Err(err) => {
            log::error!("Build failed: {err}");
            eprintln!("Error: {err}");
            exit_code_for(&err)
        }
    }
}
