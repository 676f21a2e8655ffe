use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "yolo-server", about = "Compile natural-language requests into transaction packages")]
struct Args {
    #[arg(long, env = "YOLO_CONFIG", default_value = "configs/yolo.yaml")]
    config: PathBuf,
    /// Overrides `server.listen` from the config file.
    #[arg(long, env = "YOLO_LISTEN")]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = yolo_config::load_config(&args.config)
        .with_context(|| format!("load config '{}' failed", args.config.display()))?;
    yolo_server::init_tracing(&config.observability);

    let listen = match args.listen {
        Some(listen) => listen,
        None => config
            .server
            .listen
            .parse()
            .with_context(|| format!("invalid server.listen '{}'", config.server.listen))?,
    };

    yolo_server::run_server(config, listen).await
}
