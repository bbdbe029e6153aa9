mod cli;
mod infra;
mod report;
mod routes;
mod server;

use skin_survey::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
