use clap::{value_parser, Arg, Command};
use teklif_api::config::Config;
use teklif_api::logging::init_logging;
use teklif_api::server::{create_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    let matches = command().get_matches();

    // 加载配置，命令行参数优先
    let mut config = Config::load(matches.get_one::<String>("config").map(String::as_str))?;
    if let Some(port) = matches.get_one::<u16>("port") {
        config.server.port = *port;
    }

    init_logging(&config)?;

    tracing::info!(
        data_dir = %config.storage.data_dir.display(),
        "Starting offer comparison service"
    );

    let addr = config.bind_addr();
    let app = create_app(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", &addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn command() -> Command {
    Command::new("teklif-api")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Vendor offer comparison with KDV calculations")
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .value_parser(value_parser!(u16))
                .help("The port to serve on"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("DIR")
                .help("Directory containing application.toml"),
        )
}
