// Drover CLI - fan-out remote command execution

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};

use drover::command::template::{
    VariableSet, HOME_DIRECTORY, HOST_USER_ID, ROOT_DIRECTORY, SOURCE_DIRECTORY, SSH_PRIVATE_KEY,
};
use drover::command::CommandCatalog;
use drover::executor::BatchExecutor;
use drover::inventory;
use drover::output::{
    json_output, LoggingListener, OutputListener, PrintingListener, TerminalReport,
};

#[derive(Parser)]
#[command(
    name = "drover",
    about = "Fan-out remote command execution",
    version,
    disable_colored_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    output_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a named command from the catalog on a set of hosts
    Run {
        /// Command id to look up in the catalog
        command_id: String,

        /// Path to the command catalog
        #[arg(short, long, default_value = "commands.yaml")]
        commands: PathBuf,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Run a raw command template on a set of hosts
    Exec {
        /// Command template with ${hostName}-style placeholders
        template: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// List command ids available in the catalog
    List {
        /// Path to the command catalog
        #[arg(short, long, default_value = "commands.yaml")]
        commands: PathBuf,
    },
}

#[derive(Args)]
struct TargetArgs {
    /// Path to a hosts file (one host per line)
    #[arg(short, long)]
    inventory: Option<PathBuf>,

    /// Comma-separated host list (alternative to inventory file)
    #[arg(short = 'H', long)]
    hosts: Option<String>,

    /// Remote user substituted for ${hostUserId}
    #[arg(short, long, default_value = "root")]
    user: String,

    /// SSH private key path substituted for ${sshPrivateKey}
    #[arg(long)]
    private_key: Option<PathBuf>,

    /// Remote root directory substituted for ${rootDirectory}
    #[arg(long)]
    root_dir: Option<String>,

    /// Remote home directory substituted for ${homeDirectory}
    #[arg(long)]
    home_dir: Option<String>,

    /// Local source directory substituted for ${sourceDirectory}
    #[arg(long)]
    source_dir: Option<String>,

    /// Per-host command timeout in seconds
    #[arg(long, default_value = "300")]
    timeout: u64,

    /// Maximum parallel hosts (0 = one worker per host)
    #[arg(long, default_value = "0")]
    forks: usize,
}

impl TargetArgs {
    fn resolve_hosts(&self) -> Result<Vec<String>> {
        let mut hosts = Vec::new();

        if let Some(path) = &self.inventory {
            hosts.extend(inventory::load_hosts_file(path)?);
        }
        if let Some(list) = &self.hosts {
            hosts.extend(inventory::parse_host_list(list));
        }

        let hosts = inventory::dedup_hosts(hosts);
        if hosts.is_empty() {
            bail!("no hosts given; use --hosts or --inventory");
        }

        Ok(hosts)
    }

    fn variables(&self) -> VariableSet {
        let mut vars = VariableSet::new().with(HOST_USER_ID, &self.user);

        if let Some(key) = &self.private_key {
            vars.set(SSH_PRIVATE_KEY, key.display().to_string());
        }
        if let Some(dir) = &self.root_dir {
            vars.set(ROOT_DIRECTORY, dir);
        }
        if let Some(dir) = &self.home_dir {
            vars.set(HOME_DIRECTORY, dir);
        }
        if let Some(dir) = &self.source_dir {
            vars.set(SOURCE_DIRECTORY, dir);
        }

        vars
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        eprintln!("{e:#}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_filter = if quiet {
        "drover=error"
    } else if verbose {
        "drover=debug"
    } else {
        "drover=info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Commands::Run {
            command_id,
            commands,
            target,
        } => {
            let catalog = CommandCatalog::load(commands)?;
            let template = catalog.lookup(command_id)?.to_string();
            run_batch(command_id, &template, target, &cli).await
        }

        Commands::Exec { template, target } => run_batch(template, template, target, &cli).await,

        Commands::List { commands } => {
            let catalog = CommandCatalog::load(commands)?;
            for name in catalog.names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

async fn run_batch(label: &str, template: &str, target: &TargetArgs, cli: &Cli) -> Result<()> {
    let hosts = target.resolve_hosts()?;
    let vars = target.variables();
    let json = cli.output_format == "json";

    // In JSON mode streamed lines go to the log on stderr, keeping stdout
    // machine-readable; in text mode they are printed host-prefixed.
    let listener: Arc<dyn OutputListener> = if json {
        Arc::new(LoggingListener)
    } else {
        Arc::new(PrintingListener)
    };

    let executor = BatchExecutor::new(listener)
        .with_timeout(Duration::from_secs(target.timeout))
        .with_forks(if target.forks == 0 {
            None
        } else {
            Some(target.forks)
        });

    let terminal = TerminalReport::new(cli.quiet);
    if !json {
        terminal.print_batch_header(label, hosts.len());
    }

    let started = Instant::now();
    let report = executor.execute(template, &hosts, &vars).await;
    let elapsed = started.elapsed();

    if json {
        json_output::print_report(label, &report, elapsed);
    } else {
        terminal.print_report(&report, elapsed);
    }

    let errors = report.error_summary();
    if !errors.is_empty() {
        bail!(errors);
    }

    Ok(())
}
