use colored::Colorize;
use mock_props::cli::CommandLineInterface;

fn main() {
    let command_line_interface = CommandLineInterface::load();
    init_tracing(command_line_interface.verbose);
    if let Err(error) = command_line_interface.run() {
        eprintln!("{} {error:#}", "error:".red().bold());
        std::process::exit(1);
    }
}

// stdout carries the JSON output, so logs go to stderr
fn init_tracing(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
