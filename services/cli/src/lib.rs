mod cli;
mod commands;
mod demo;
mod infra;

use carhub::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
