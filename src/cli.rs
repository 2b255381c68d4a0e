use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use estate_market::models::{ListingType, PropertyType, Role};

#[derive(Debug, Parser)]
#[command(name = "estate", version, about = "Browse and manage the estate marketplace")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend base URL, overrides api.base_url
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print raw JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a client or agent account
    Signup(SignupArgs),
    /// Sign in and store the token pair
    Signin {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored tokens
    Signout,
    /// Show the signed-in profile
    Whoami,
    /// Role-specific dashboard
    Dashboard,
    Listings {
        #[command(subcommand)]
        action: ListingCommands,
    },
    Inquiries {
        #[command(subcommand)]
        action: InquiryCommands,
    },
    Saved {
        #[command(subcommand)]
        action: SavedCommands,
    },
    /// Agent accounts (admin)
    Agents {
        #[command(subcommand)]
        action: AgentCommands,
    },
    /// Market overview (admin)
    Analytics,
    /// Compare two listings side by side
    Compare { first: String, second: String },
    Payments {
        #[command(subcommand)]
        action: PaymentCommands,
    },
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    #[arg(short, long)]
    pub name: String,
    #[arg(short, long)]
    pub email: String,
    #[arg(short, long)]
    pub password: String,
    /// CLIENT or AGENT
    #[arg(short, long, default_value = "CLIENT")]
    pub role: Role,
    #[arg(long)]
    pub phone: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ListingCommands {
    /// Every listing (admin)
    List,
    /// Approved listings, optionally filtered
    Approved(FilterArgs),
    /// The signed-in agent's listings
    Mine,
    /// Listings waiting for approval (admin)
    Pending,
    Show { id: String },
    Create(CreateListingArgs),
    Update(UpdateListingArgs),
    Delete { id: String },
    Approve { id: String },
    Reject { id: String },
}

#[derive(Debug, Default, Args)]
pub struct FilterArgs {
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long = "type", value_parser = parse_property_type)]
    pub property_type: Option<PropertyType>,
    /// SALE or RENT
    #[arg(long)]
    pub listing_type: Option<ListingType>,
    #[arg(long)]
    pub min_price: Option<f64>,
    #[arg(long)]
    pub max_price: Option<f64>,
    #[arg(long)]
    pub bedrooms: Option<u32>,
}

#[derive(Debug, Args)]
pub struct CreateListingArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub price: f64,
    #[arg(long)]
    pub address: String,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub lng: Option<f64>,
    #[arg(long)]
    pub bedrooms: Option<u32>,
    #[arg(long)]
    pub bathrooms: Option<u32>,
    #[arg(long)]
    pub size: Option<f64>,
    #[arg(long = "type", value_parser = parse_property_type)]
    pub property_type: PropertyType,
    #[arg(long)]
    pub listing_type: ListingType,
    /// Image files to upload, repeatable
    #[arg(long = "image", required = true)]
    pub images: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct UpdateListingArgs {
    pub id: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    #[arg(long)]
    pub bedrooms: Option<u32>,
    #[arg(long)]
    pub bathrooms: Option<u32>,
    #[arg(long)]
    pub size: Option<f64>,
    #[arg(long)]
    pub listing_type: Option<ListingType>,
}

#[derive(Debug, Subcommand)]
pub enum InquiryCommands {
    /// Ask the listing's agent a question (client)
    Send { listing_id: String, message: String },
    /// Inquiries sent (client) or received (agent)
    List,
    /// Reply to an inquiry (agent)
    Respond { id: String, response: String },
    Close { id: String },
}

#[derive(Debug, Subcommand)]
pub enum SavedCommands {
    List,
    Save { listing_id: String },
    Unsave { listing_id: String },
    Toggle { listing_id: String },
    Check { listing_id: String },
}

#[derive(Debug, Subcommand)]
pub enum AgentCommands {
    List,
    /// Activate or deactivate an agent account
    Toggle { id: String },
}

#[derive(Debug, Subcommand)]
pub enum PaymentCommands {
    Status { listing_id: String },
    MarkPaid { listing_id: String },
}

fn parse_property_type(raw: &str) -> Result<PropertyType, String> {
    if raw.trim().is_empty() {
        return Err("property type must not be empty".into());
    }
    Ok(PropertyType::parse(raw))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "estate",
            "listings",
            "approved",
            "--city",
            "York",
            "--type",
            "villa",
            "--json",
            "--api-url",
            "http://127.0.0.1:5000/api",
        ])
        .expect("cli parses");

        assert!(cli.json);
        assert_eq!(cli.api_url.as_deref(), Some("http://127.0.0.1:5000/api"));
        let Commands::Listings {
            action: ListingCommands::Approved(filter),
        } = cli.command
        else {
            panic!("expected listings approved");
        };
        assert_eq!(filter.city.as_deref(), Some("York"));
        assert_eq!(filter.property_type, Some(PropertyType::Villa));
    }

    #[test]
    fn create_requires_an_image() {
        let result = Cli::try_parse_from([
            "estate",
            "listings",
            "create",
            "--title",
            "Barn",
            "--description",
            "Old barn",
            "--price",
            "1000",
            "--address",
            "1 Farm Ln",
            "--type",
            "HOUSE",
            "--listing-type",
            "SALE",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn signup_role_parses_case_insensitively() {
        let cli = Cli::try_parse_from([
            "estate",
            "signup",
            "-n",
            "Ann",
            "-e",
            "ann@example.com",
            "-p",
            "secret1",
            "-r",
            "agent",
        ])
        .expect("cli parses");
        let Commands::Signup(args) = cli.command else {
            panic!("expected signup");
        };
        assert_eq!(args.role, Role::Agent);
    }
}
