mod cli;
mod infra;
mod routes;
mod server;
mod views;

use loan_approval::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
