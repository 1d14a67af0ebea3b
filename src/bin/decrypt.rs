use clap::Parser;
use log::LevelFilter;
use rsakit::cmd::DecryptArgs;

fn main() {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(e) = DecryptArgs::parse().exe() {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
