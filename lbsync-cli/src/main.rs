//! lbsync: drive a load balancer through its lifecycle.
//!
//! Runs the reconciler against an in-process control plane whose inventory
//! is kept in the state file next to the resource's field map, so a create
//! interrupted by a timeout can be resumed with `read`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use lbsync::{
    schema, FieldValue, LoadBalancerReconciler, MemoryControlPlane, ReconcilerConfig,
    ResourceData, ResourceReconciler, Timeouts,
};
use tabled::{Table, Tabled};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod state_file;

use state_file::StateFile;

#[derive(Parser, Debug)]
#[command(name = "lbsync", version, about)]
struct Cli {
    /// Session state (field map and control plane inventory)
    #[arg(long, default_value = "lbsync.json")]
    state_file: PathBuf,

    /// Seconds between two polls
    #[arg(long, default_value = "5")]
    poll_interval: u64,

    /// Seconds a create may wait for the load balancer to become active
    #[arg(long, default_value = "1200")]
    create_timeout: u64,

    /// Seconds a delete may wait for the load balancer to disappear
    #[arg(long, default_value = "1200")]
    delete_timeout: u64,

    /// Polls after which a local work request succeeds
    #[arg(long, default_value = "3")]
    settle_after: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a load balancer and wait until it is active
    Create {
        #[arg(long)]
        compartment_id: String,

        /// Shape, e.g. 100Mbps
        #[arg(long)]
        shape: String,

        /// Subnet to attach (repeatable)
        #[arg(long = "subnet-id", required = true)]
        subnet_ids: Vec<String>,

        #[arg(long)]
        display_name: String,
    },

    /// Refresh the tracked load balancer
    Read,

    /// Rename the tracked load balancer
    Update {
        #[arg(long)]
        display_name: Option<String>,
    },

    /// Delete the tracked load balancer and wait until it is gone
    Delete,

    /// Print the stored fields without contacting the control plane
    Show,
}

impl Cli {
    fn config(&self) -> ReconcilerConfig {
        ReconcilerConfig {
            poll_interval: Duration::from_secs(self.poll_interval),
            create_timeout: Duration::from_secs(self.create_timeout),
            delete_timeout: Duration::from_secs(self.delete_timeout),
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "FIELD")]
    field: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

fn format_value(value: &FieldValue) -> String {
    match value {
        FieldValue::String(s) if s.is_empty() => "-".to_string(),
        FieldValue::String(s) => s.clone(),
        FieldValue::List(items) if items.is_empty() => "-".to_string(),
        FieldValue::List(items) => items.join(", "),
    }
}

fn print_fields(data: &ResourceData) {
    if data.id().is_empty() {
        println!("No load balancer tracked");
        return;
    }
    let rows: Vec<FieldRow> = data
        .fields()
        .map(|(field, value)| FieldRow {
            field: field.to_string(),
            value: format_value(value),
        })
        .collect();
    println!("Tracking {}", data.id());
    println!("{}", Table::new(rows));
}

async fn run(
    reconciler: &LoadBalancerReconciler,
    command: Commands,
    data: &mut ResourceData,
) -> Result<()> {
    match command {
        Commands::Create {
            compartment_id,
            shape,
            subnet_ids,
            display_name,
        } => {
            if !data.id().is_empty() {
                bail!(
                    "state file already tracks {}; delete it before creating another",
                    data.id()
                );
            }
            *data = ResourceData::new(data.timeouts);
            data.set_str(schema::COMPARTMENT_ID, compartment_id);
            data.set_str(schema::SHAPE, shape);
            data.set_list(schema::SUBNET_IDS, subnet_ids);
            data.set_str(schema::DISPLAY_NAME, display_name);
            reconciler.create(data).await.context("create failed")
        }
        Commands::Read => reconciler.read(data).await.context("read failed"),
        Commands::Update { display_name } => {
            if let Some(name) = display_name {
                data.set_str(schema::DISPLAY_NAME, name);
            }
            reconciler.update(data).await.context("update failed")
        }
        Commands::Delete => reconciler.delete(data).await.context("delete failed"),
        Commands::Show => Ok(()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lbsync=info,lbsync_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    let mut state = StateFile::load(&cli.state_file).await?;

    let plane = Arc::new(MemoryControlPlane::with_inventory(
        std::mem::take(&mut state.inventory),
        cli.settle_after,
    ));
    let reconciler = LoadBalancerReconciler::new(plane.clone(), config);
    state.resource.timeouts = Timeouts::from(reconciler.config());

    info!(state_file = %cli.state_file.display(), command = ?cli.command, "Running");
    let outcome = run(&reconciler, cli.command, &mut state.resource).await;

    // Persist even on failure: a timed-out create leaves its work request in
    // the identifier slot for the next read to pick up.
    state.inventory = plane.snapshot()?;
    state.save(&cli.state_file).await?;
    outcome?;

    print_fields(&state.resource);
    Ok(())
}
