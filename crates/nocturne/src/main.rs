use clap::Parser;
use nocturne::{init_tracing, run, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdout = std::io::stdout();
    run(&cli, &mut stdout.lock())
}
