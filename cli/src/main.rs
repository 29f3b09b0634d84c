mod commands;
mod terminal;

use commands::{CommandLine, Commands, decode, encode, interfaces, wait};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose);

    match commands.command {
        Commands::Interfaces => {
            print::header("network interfaces");
            interfaces::interfaces()
        }
        Commands::Wait(args) => {
            print::header("waiting for the network");
            wait::wait(args).await
        }
        Commands::Encode { endpoint } => encode::encode(&endpoint),
        Commands::Decode { hex } => decode::decode(&hex),
    }
}
