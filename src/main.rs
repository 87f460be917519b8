use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use stakehouse::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for stakehouse::AppCommand {
    fn from(cmd: Commands) -> stakehouse::AppCommand {
        match cmd {
            Commands::Originate {
                property_id,
                occupant,
                address,
            } => stakehouse::AppCommand::Originate {
                property_id,
                occupant_id: occupant,
                address,
            },
            Commands::Status { property_id } => stakehouse::AppCommand::Status { property_id },
            Commands::Issue {
                property_id,
                investor,
                amount,
            } => stakehouse::AppCommand::Issue {
                property_id,
                investor_id: investor,
                amount_percent: amount,
            },
            Commands::Transfer {
                property_id,
                seller,
                buyer,
                amount,
            } => stakehouse::AppCommand::Transfer {
                property_id,
                buyer_id: buyer,
                seller_id: seller,
                amount_percent: amount,
            },
            Commands::Sync { property_id } => stakehouse::AppCommand::Sync { property_id },
            Commands::Dues { property_id } => stakehouse::AppCommand::Dues { property_id },
            Commands::Shares {
                property_id,
                investor,
            } => stakehouse::AppCommand::Shares {
                property_id,
                investor_id: investor,
            },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Originate a property agreement from a warehouse valuation record
    Originate {
        /// Warehouse property id
        property_id: String,
        /// Occupant stakeholder id; starts at the 51% controlling floor
        #[arg(long)]
        occupant: String,
        /// Display address; defaults to the property id
        #[arg(long)]
        address: Option<String>,
    },
    /// Display property agreement status
    Status {
        /// Property id; omit to list every agreement
        property_id: Option<String>,
    },
    /// Issue unallocated equity to an investor
    Issue {
        property_id: String,
        #[arg(long)]
        investor: String,
        /// Equity percentage to issue
        #[arg(long)]
        amount: f64,
    },
    /// Transfer equity between stakeholders
    Transfer {
        property_id: String,
        #[arg(long)]
        seller: String,
        #[arg(long)]
        buyer: String,
        /// Equity percentage to transfer
        #[arg(long)]
        amount: f64,
    },
    /// Refresh market valuations from the warehouse
    Sync {
        /// Property id; omit to sync every agreement
        property_id: Option<String>,
    },
    /// Display monthly dues apportionment
    Dues { property_id: String },
    /// Display investor share values and unrealized profit
    Shares {
        property_id: String,
        #[arg(long)]
        investor: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => stakehouse::cli::setup::setup(),
        Some(cmd) => stakehouse::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
