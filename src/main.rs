use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    cartsync::app::startup::startup().await
}
