use anyhow::Context;
use clap::Parser;

use txsign::config::Args;
use txsign::workflow;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let request = args.sign_request().context("building the sign request")?;
    let outcome = workflow::run(&request).context("signing the transaction")?;

    let json = workflow::render(&outcome.tx, args.format, args.compact)?;
    println!("{}", json);
    println!("{}", outcome.fully_signed);
    Ok(())
}
