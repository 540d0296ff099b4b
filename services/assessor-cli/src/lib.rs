mod cli;
mod infra;
mod render;
mod replay;

use interview_assessor::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
