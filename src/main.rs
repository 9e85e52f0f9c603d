use clap::Parser;
use offline_cdn_mirror::cli::Cli;
use offline_cdn_mirror::logging;

fn main() {
  let cli = Cli::parse();

  if let Err(err) = logging::init_logging(cli.verbose) {
    eprintln!("offline-cdn-mirror: {err:#}");
  }

  if let Err(err) = cli.run() {
    eprintln!("offline-cdn-mirror error: {err:#}");
    std::process::exit(1);
  }
}
