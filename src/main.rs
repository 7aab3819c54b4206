use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, CommandFactory, Parser, Subcommand};
use entra_audit_tools::audit::export::ExportFormat;
use entra_audit_tools::audit::filter::{AuditWindow, DEFAULT_WINDOW_DAYS, SSPR_ACTIVITY};
use entra_audit_tools::audit::projection::FieldSet;
use entra_audit_tools::commands::role_assignments::RoleExportOptions;
use entra_audit_tools::commands::sspr_audit::AuditExportOptions;
use entra_audit_tools::commands::{export_all, role_assignments, sspr_audit};
use entra_audit_tools::config::{self, Credentials, GraphEndpoints, DEFAULT_TIMEOUT_SECS};
use entra_audit_tools::graph_api::{self, GraphClient};
use entra_audit_tools::utils::time::parse_timestamp;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "entra-audit")]
#[command(about = "Microsoft Entra audit log and role assignment export tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Directory (tenant) ID [env: TENANT_ID]
    #[arg(long, global = true)]
    tenant_id: Option<String>,

    /// Application (client) ID [env: CLIENT_ID]
    #[arg(long, global = true)]
    client_id: Option<String>,

    /// Client secret [env: CLIENT_SECRET]
    #[arg(long, global = true)]
    client_secret: Option<String>,

    /// Load credentials from this dotenv file instead of .env.local / .env
    #[arg(long, global = true)]
    env_file: Option<String>,

    /// Microsoft Graph base URL
    #[arg(long, global = true)]
    graph_url: Option<String>,

    /// OAuth2 authority URL
    #[arg(long, global = true)]
    authority_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Enable debug logging (overridden by ENTRA_AUDIT_LOG)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors and hide progress bars
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Args)]
struct AuditArgs {
    /// Activity display name to filter on
    #[arg(long, default_value = SSPR_ACTIVITY)]
    activity: String,

    /// Length of the trailing window in days
    #[arg(long, default_value_t = DEFAULT_WINDOW_DAYS)]
    days: u32,

    /// End the window at this RFC 3339 instant instead of now
    #[arg(long)]
    as_of: Option<String>,

    /// Columns to export
    #[arg(long, value_enum, default_value = "full")]
    fields: FieldSet,
}

#[derive(Args)]
struct OutputArgs {
    /// Output format (default: both for audits, csv for role assignments)
    #[arg(long, value_enum)]
    format: Option<ExportFormat>,

    /// Directory to write export files into
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Export self-service password reset audit events
    SsprAudit {
        #[command(flatten)]
        audit: AuditArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Export directory role assignments with resolved principals
    RoleAssignments {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run the audit export, then the role-assignment export
    ExportAll {
        #[command(flatten)]
        audit: AuditArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate shell completion scripts
    GenerateCompletion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("ENTRA_AUDIT_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}

async fn connect(global: &GlobalArgs) -> Result<GraphClient> {
    config::load_env_files(global.env_file.as_deref())?;

    let credentials = Credentials::from_options(
        global.tenant_id.as_deref(),
        global.client_id.as_deref(),
        global.client_secret.as_deref(),
    )?;
    let endpoints = GraphEndpoints::from_options(
        global.authority_url.as_deref(),
        global.graph_url.as_deref(),
        global.timeout_secs,
    );

    graph_api::authenticate(&credentials, &endpoints)
        .await
        .with_context(|| {
            format!(
                "Failed to authenticate application {} in tenant {}",
                credentials.client_id, credentials.tenant_id
            )
        })
}

fn audit_options(audit: &AuditArgs, output: &OutputArgs) -> Result<AuditExportOptions> {
    let as_of = audit.as_of.as_deref().map(parse_timestamp).transpose()?;
    AuditWindow::trailing(as_of.unwrap_or_else(Utc::now), audit.days)?;
    Ok(AuditExportOptions {
        activity: audit.activity.clone(),
        days: audit.days,
        as_of,
        fields: audit.fields,
        format: output.format.unwrap_or(ExportFormat::Both),
        output_dir: output.output_dir.clone(),
    })
}

fn role_options(output: &OutputArgs, quiet: bool) -> RoleExportOptions {
    RoleExportOptions {
        format: output.format.unwrap_or(ExportFormat::Csv),
        output_dir: output.output_dir.clone(),
        show_progress: !quiet,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.quiet, cli.global.verbose)?;

    match cli.command {
        Commands::SsprAudit { audit, output } => {
            let options = audit_options(&audit, &output)?;
            let client = connect(&cli.global).await?;
            sspr_audit::run(&client, &options).await?;
        }
        Commands::RoleAssignments { output } => {
            let options = role_options(&output, cli.global.quiet);
            let client = connect(&cli.global).await?;
            role_assignments::run(&client, &options).await?;
        }
        Commands::ExportAll { audit, output } => {
            let audit_opts = audit_options(&audit, &output)?;
            let role_opts = role_options(&output, cli.global.quiet);
            let client = connect(&cli.global).await?;
            export_all::run(&client, &audit_opts, &role_opts).await?;
        }
        Commands::GenerateCompletion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "entra-audit", &mut std::io::stdout());
        }
    }

    Ok(())
}
