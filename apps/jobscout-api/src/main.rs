use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = jobscout_api::Args::parse();

	jobscout_api::run(args).await
}
