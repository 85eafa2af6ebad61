use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use rust_decimal::Decimal;

use super::formatter::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "payouts", version, about = "Affiliate payouts admin and CLI.", long_about = None)]
pub struct Args {
    #[arg(short, long, default_value = "payouts.toml")]
    pub config: String,
    #[arg(long, default_value = "log4rs.yaml")]
    pub log4rs: String,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Runs the admin web server.
    Serve {
        /// Overrides `server.listen` from the config file.
        #[arg(short, long)]
        listen: Option<String>,
    },
    /// Manages payouts.
    #[command(subcommand)]
    Payout(PayoutCommand),
    /// Prints reports.
    #[command(subcommand)]
    Report(ReportCommand),
}

#[derive(Subcommand, Debug)]
pub enum PayoutCommand {
    /// Shows a single payout.
    Get(GetArgs),
    /// Creates payouts from unpaid referrals.
    Create(CreateArgs),
    /// Updates a payout.
    Update(UpdateArgs),
    /// Deletes a payout.
    Delete(DeleteArgs),
    /// Lists payouts.
    List(ListArgs),
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Prints the value of a single field.
    #[arg(long)]
    pub field: Option<String>,
    /// Comma-separated fields to show.
    #[arg(long)]
    pub fields: Option<String>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct GetArgs {
    /// Payout ID.
    pub id: String,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct CreateArgs {
    /// Only referrals on or after this date (YYYY-MM-DD).
    #[arg(long = "start_date")]
    pub start_date: Option<NaiveDate>,
    /// Only referrals on or before this date (YYYY-MM-DD).
    #[arg(long = "end_date")]
    pub end_date: Option<NaiveDate>,
    /// Minimum total an affiliate must have earned to be paid.
    #[arg(long = "min_earnings")]
    pub min_earnings: Option<Decimal>,
    #[arg(long = "payout_method", default_value = "cli")]
    pub payout_method: String,
    #[arg(long = "referral_status", default_value = "unpaid")]
    pub referral_status: String,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct UpdateArgs {
    /// Payout ID.
    pub id: String,
    #[arg(long = "affiliate_id")]
    pub affiliate_id: Option<i64>,
    #[arg(long)]
    pub amount: Option<Decimal>,
    /// Comma-separated referral IDs.
    #[arg(long)]
    pub referrals: Option<String>,
    #[arg(long = "payout_method")]
    pub payout_method: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct DeleteArgs {
    /// Payout ID.
    pub id: String,
    /// Skips the confirmation prompt.
    #[arg(long)]
    pub yes: bool,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct ListArgs {
    #[arg(long = "payout_id", visible_alias = "ID")]
    pub payout_id: Option<i64>,
    #[arg(long = "affiliate_id")]
    pub affiliate_id: Option<i64>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long = "payout_method")]
    pub payout_method: Option<String>,
    #[arg(long = "amount_min")]
    pub amount_min: Option<Decimal>,
    #[arg(long = "amount_max")]
    pub amount_max: Option<Decimal>,
    /// Maximum number of payouts to show.
    #[arg(long)]
    pub number: Option<i64>,
    #[arg(long)]
    pub offset: Option<i64>,
    #[arg(long)]
    pub orderby: Option<String>,
    #[arg(long)]
    pub order: Option<String>,
    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// Prints the affiliate registrations series.
    Registrations(RegistrationsArgs),
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct RegistrationsArgs {
    /// today, yesterday, this_week, last_week, this_month, last_month,
    /// this_quarter, last_quarter, this_year, last_year or other.
    #[arg(long, default_value = "this_month")]
    pub range: String,
    #[arg(long = "filter_from")]
    pub filter_from: Option<NaiveDate>,
    #[arg(long = "filter_to")]
    pub filter_to: Option<NaiveDate>,
    #[command(flatten)]
    pub output: OutputArgs,
}
