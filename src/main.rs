use clap::Parser;
use vitrine::config::VitrineConfig;

#[derive(Parser, Debug)]
#[command(name = "vitrine", about = "Digital-signage management service")]
struct Args {
    #[arg(long, env = "VITRINE_WORKDIR", default_value = ".", help = "Directory holding the operation log")]
    workdir: String,

    #[arg(long, env = "VITRINE_LISTEN", default_value = "[::]:4680", help = "Address to listen on")]
    listen: String,

    #[arg(
        long,
        env = "VITRINE_HEARTBEAT_TIMEOUT",
        default_value = "3m",
        value_parser = humantime::parse_duration,
        help = "Heartbeat age after which an online device is reported unresponsive"
    )]
    heartbeat_timeout: std::time::Duration,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = VitrineConfig::new(&args.workdir, args.listen, args.heartbeat_timeout)
        .expect("failed to build configuration");
    vitrine::api::serve(config).await;
}
