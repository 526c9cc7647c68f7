mod cli;
mod diagnostics;
mod infra;
mod routes;
mod server;

use webhub_careers::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
