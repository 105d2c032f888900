use clap::{Arg, Command};
use fabrica::config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = Command::new("fabrica")
        .about("Fábrica de Apps - turns an app idea into a Flutter project and APK build")
        .long_about("Serves an HTTP API that generates a Flutter main.dart with an LLM, pushes it with the project boilerplate to a new GitHub repository, and lets GitHub Actions build the APK")
        .arg(Arg::new("port")
            .long("port")
            .short('p')
            .help("Port to listen on (overrides PORT)")
            .value_name("PORT")
            .value_parser(clap::value_parser!(u16))
            .num_args(1))
        .arg(Arg::new("config")
            .long("config")
            .help("Show configuration information")
            .action(clap::ArgAction::SetTrue))
        .get_matches();

    let mut config = Config::load()?;

    if let Some(port) = matches.get_one::<u16>("port") {
        config.port = *port;
    }

    if matches.get_flag("config") {
        config.show_config_info()?;
        return Ok(());
    }

    info!("Starting Fábrica de Apps on port {}", config.port);
    fabrica::server::start_server(config).await
}
