use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = tailbox_cli::cli::Cli::parse();
    let code = tailbox_cli::cli::run(cli).await;
    std::process::exit(code);
}
