//! Command line entry points. `serve` starts the admin server, the other
//! commands run once against the configured stores and exit.

use std::io;

use chrono::Utc;

use crate::services::{
    self, payouts::PayoutRequestHandler, reports::ReportRequestHandler, Repositories,
};
use crate::settings::Settings;
use crate::views::format::DisplayFormat;

pub mod args;
pub mod formatter;
pub mod payouts;
pub mod reports;

use args::Command;

pub async fn run(
    command: Command,
    repositories: Repositories,
    mut settings: Settings,
) -> Result<(), anyhow::Error> {
    match command {
        Command::Serve { listen } => {
            if let Some(listen) = listen {
                settings.server.listen = listen;
            }
            services::start_services(repositories, &settings).await
        }
        Command::Payout(command) => {
            let format = DisplayFormat::new(
                settings.admin.currency.clone(),
                settings.admin.date_format.clone(),
            );
            let cli = payouts::PayoutCli::new(PayoutRequestHandler::new(&repositories), &format);

            let stdin = io::stdin();
            cli.run(command, &mut io::stdout().lock(), &mut stdin.lock())
                .await
        }
        Command::Report(command) => {
            let handler = ReportRequestHandler::new(repositories.affiliates.clone());
            reports::run(
                &handler,
                command,
                Utc::now().date_naive(),
                &mut io::stdout().lock(),
            )
            .await
        }
    }
}
