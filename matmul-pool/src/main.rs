use std::env;
use std::io;

use matmul_pool::prompt::Prompt;
use matmul_pool::{Config, cli, logging};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let config = Config::from_args(&args);
    logging::init(&config)?;

    let stdin = io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), io::stdout());
    // Failures are already logged; a rejected session still exits normally.
    let _ = cli::run(config, &mut prompt);
    Ok(())
}
