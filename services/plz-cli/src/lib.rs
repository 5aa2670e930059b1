mod cli;
mod oneshot;
mod render;
mod session;

use plz_lookup::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
