use std::io::{BufRead, Write};

use anyhow::{anyhow, bail};
use serde_json::{json, Value};

use super::args::{
    CreateArgs, DeleteArgs, GetArgs, ListArgs, OutputArgs, PayoutCommand, UpdateArgs,
};
use super::formatter::{Formatter, OutputFormat, Record};
use crate::models::payouts::{Payout, PayoutOrderBy, PayoutQuery, PayoutUpdate, SortOrder};
use crate::services::payouts::{CreatePayouts, PayoutRequestHandler};
use crate::services::ServiceError;
use crate::views::format::{format_date, DisplayFormat, SHORT_DATE_FORMAT};

pub const DEFAULT_FIELDS: [&str; 8] = [
    "ID",
    "amount",
    "affiliate_id",
    "affiliate_email",
    "referrals",
    "payout_method",
    "status",
    "date",
];
const FIELD_ALIASES: [(&str, &str); 1] = [("payout_id", "ID")];

const INVALID_ID: &str = "A valid payout ID is required to proceed.";

/// `payouts payout <command>`. Output goes to `out`, confirmations are read from `input`.
pub struct PayoutCli<'a> {
    handler: PayoutRequestHandler,
    format: &'a DisplayFormat,
}

impl<'a> PayoutCli<'a> {
    pub fn new(handler: PayoutRequestHandler, format: &'a DisplayFormat) -> Self {
        Self { handler, format }
    }

    pub async fn run(
        &self,
        command: PayoutCommand,
        out: &mut impl Write,
        input: &mut impl BufRead,
    ) -> anyhow::Result<()> {
        match command {
            PayoutCommand::Get(args) => self.get(args, out).await,
            PayoutCommand::Create(args) => self.create(args, out).await,
            PayoutCommand::Update(args) => self.update(args, out).await,
            PayoutCommand::Delete(args) => self.delete(args, out, input).await,
            PayoutCommand::List(args) => self.list(args, out).await,
        }
    }

    /// Applies the display handlers: currency amount, affiliate email lookup, short date.
    async fn record(&self, payout: &Payout) -> anyhow::Result<Record> {
        let email = self.handler.affiliate_email(payout.affiliate_id).await?;

        let record = json!({
            "ID": payout.payout_id,
            "amount": self.format.currency(payout.amount),
            "affiliate_id": payout.affiliate_id,
            "affiliate_email": email.unwrap_or_default(),
            "referrals": payout.referrals,
            "payout_method": payout.payout_method,
            "status": payout.status,
            "date": format_date(payout.date, SHORT_DATE_FORMAT),
        });

        match record {
            Value::Object(map) => Ok(map),
            _ => Err(anyhow!("Payout record is not an object.")),
        }
    }

    async fn get(&self, args: GetArgs, out: &mut impl Write) -> anyhow::Result<()> {
        let payout_id = args.id.trim().parse::<i64>().map_err(|_| {
            anyhow!("Could not find the payout with ID {}.", args.id)
        })?;
        let payout = self.handler.get_payout(payout_id).await?;

        formatter(&args.output).display_item(out, &self.record(&payout).await?)
    }

    async fn create(&self, args: CreateArgs, out: &mut impl Write) -> anyhow::Result<()> {
        let request = CreatePayouts {
            start_date: args.start_date,
            end_date: args.end_date,
            min_earnings: args.min_earnings.unwrap_or_default(),
            payout_method: args.payout_method,
            referral_status: args.referral_status,
        };
        let batch = self.handler.create_payouts(&request).await?;

        if batch.referrals_found == 0 {
            writeln!(
                out,
                "Warning: No referrals were found matching your criteria. Please try again."
            )?;
        }

        if batch.outcomes.is_empty() {
            writeln!(
                out,
                "Warning: No affiliates matched the minimum earnings amount in order to generate a payout."
            )?;
            return Ok(());
        }

        for outcome in &batch.outcomes {
            let amount = self.format.currency(outcome.amount);
            match outcome.result {
                Ok(_) => writeln!(
                    out,
                    "Success: A payout has been created for Affiliate #{} for {}.",
                    outcome.affiliate_id, amount
                )?,
                Err(_) => writeln!(
                    out,
                    "Warning: There was a problem generating a payout for Affiliate #{} for {}.",
                    outcome.affiliate_id, amount
                )?,
            }
        }

        Ok(())
    }

    async fn update(&self, args: UpdateArgs, out: &mut impl Write) -> anyhow::Result<()> {
        let payout_id = parse_id(&args.id)?;
        let referrals = match &args.referrals {
            Some(referrals) => Some(parse_referrals(referrals)?),
            None => None,
        };

        let update = PayoutUpdate {
            affiliate_id: args.affiliate_id,
            referrals,
            amount: args.amount,
            payout_method: args.payout_method,
            status: args.status,
        };
        let payout = self.handler.update_payout(payout_id, &update).await?;

        writeln!(out, "Success: Payout #{} has been updated.", payout.payout_id)?;
        Ok(())
    }

    async fn delete(
        &self,
        args: DeleteArgs,
        out: &mut impl Write,
        input: &mut impl BufRead,
    ) -> anyhow::Result<()> {
        let payout_id = parse_id(&args.id)?;
        match self.handler.get_payout(payout_id).await {
            Ok(_) => {}
            Err(ServiceError::NotFound(_)) => bail!(INVALID_ID),
            Err(e) => return Err(e.into()),
        }

        if !args.yes && !confirm(out, input, "Are you sure you want to delete this payout?")? {
            return Ok(());
        }

        if !self.handler.delete_payout(payout_id).await? {
            bail!("The payout could not be deleted.");
        }

        writeln!(out, "Success: The payout has been successfully deleted.")?;
        Ok(())
    }

    async fn list(&self, args: ListArgs, out: &mut impl Write) -> anyhow::Result<()> {
        let query = PayoutQuery {
            number: args.number.filter(|number| *number > 0),
            offset: args.offset.unwrap_or(0).max(0),
            payout_id: args.payout_id,
            affiliate_id: args.affiliate_id,
            status: args.status,
            payout_method: args.payout_method,
            amount_min: args.amount_min,
            amount_max: args.amount_max,
            orderby: PayoutOrderBy::parse(args.orderby.as_deref().unwrap_or("")),
            order: SortOrder::parse(args.order.as_deref().unwrap_or("")),
        };

        match args.output.format {
            OutputFormat::Count => {
                let count = self.handler.count_payouts(&query).await?;
                writeln!(out, "Number of payouts: {}", count)?;
            }
            OutputFormat::Ids => {
                let ids: Vec<String> = self
                    .handler
                    .list_payouts(&query)
                    .await?
                    .iter()
                    .map(|payout| payout.payout_id.to_string())
                    .collect();
                writeln!(out, "{}", ids.join(" "))?;
            }
            _ => {
                let mut records = Vec::new();
                for payout in self.handler.list_payouts(&query).await? {
                    records.push(self.record(&payout).await?);
                }

                formatter(&args.output).display_items(out, &records)?;
            }
        }

        Ok(())
    }
}

fn formatter(output: &OutputArgs) -> Formatter {
    Formatter::new(
        output.format,
        output.field.as_deref(),
        output.fields.as_deref(),
        &DEFAULT_FIELDS,
        &FIELD_ALIASES,
    )
}

fn parse_id(id: &str) -> anyhow::Result<i64> {
    id.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| anyhow!(INVALID_ID))
}

fn parse_referrals(referrals: &str) -> anyhow::Result<Vec<i64>> {
    referrals
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<i64>()
                .map_err(|_| anyhow!("Invalid referral ID: {}.", id))
        })
        .collect()
}

/// Asks a yes/no question. Anything but an answer starting with `y` declines.
fn confirm(out: &mut impl Write, input: &mut impl BufRead, question: &str) -> anyhow::Result<bool> {
    write!(out, "{} [y/n] ", question)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;

    Ok(answer.trim().to_ascii_lowercase().starts_with('y'))
}
