use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use swire_isp::constants::{DEFAULT_ACTIVATION_MS, DEFAULT_PORT};
use swire_isp::transport::SerialTransport;
use swire_isp::{Config, Flashing};

#[derive(Parser)]
#[command(
    name = "swire-isp",
    about = "Flash SWire MCUs through a plain USB-UART adapter"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Raw firmware binary to write (same as `flash <FIRMWARE>`).
    /// A file named like a subcommand needs `flash <FIRMWARE>` or `./<FIRMWARE>`.
    firmware: Option<PathBuf>,

    /// Serial port of the UART adapter
    #[arg(short, long, global = true, default_value = DEFAULT_PORT)]
    port: String,

    /// How long to keep sending CPU stop commands, in ms
    #[arg(short = 't', long, global = true, default_value_t = DEFAULT_ACTIVATION_MS)]
    activation_time: u64,

    /// Print protocol details, repeat for every register write
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Unlock, erase and program the flash, then reset
    Flash {
        /// The path to the raw binary to be written from address 0
        path: PathBuf,
    },
    /// Erase the whole flash
    Erase {},
    /// Clear the flash write protection
    Unlock {},
    /// Reset the target
    Reset {},
    /// List available serial ports
    Ports {},
}

impl Cli {
    /// Resolve the bare firmware argument into a `flash` command.
    fn into_command(self) -> Result<(Config, Command)> {
        let command = match (self.command, self.firmware) {
            (Some(command), None) => command,
            (None, Some(path)) => Command::Flash { path },
            (Some(command), Some(path)) => anyhow::bail!(
                "firmware {} cannot be combined with {:?}",
                path.display(),
                command
            ),
            (None, None) => anyhow::bail!("no firmware given, see --help"),
        };
        Ok((Config::new(self.port, self.activation_time), command))
    }
}

/// Open the port, activate the target, run `op` and close the port.
fn with_target<F>(config: &Config, op: F) -> Result<()>
where
    F: FnOnce(&mut Flashing<SerialTransport>) -> swire_isp::Result<()>,
{
    let mut flashing = Flashing::new_from_serial(config)?;
    flashing.activate()?;
    op(&mut flashing)?;
    flashing.close()?;
    log::info!("Done.");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => simplelog::LevelFilter::Info,
        1 => simplelog::LevelFilter::Debug,
        _ => simplelog::LevelFilter::Trace,
    };
    let _ = simplelog::TermLogger::init(
        level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    let (config, command) = cli.into_command()?;
    match command {
        Command::Flash { path } => {
            // read the image before touching the target
            let image = swire_isp::format::read_firmware_from_file(path)?;
            with_target(&config, |flashing| {
                flashing.unprotect()?;
                flashing.erase_chip()?;
                flashing.flash(&image)
            })
        }
        Command::Erase {} => with_target(&config, |flashing| flashing.erase_chip()),
        Command::Unlock {} => with_target(&config, |flashing| flashing.unprotect()),
        Command::Reset {} => with_target(&config, |flashing| flashing.soft_reset()),
        Command::Ports {} => {
            for port in SerialTransport::scan_ports()? {
                println!("{}", port);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<(Config, Command)> {
        Cli::try_parse_from(args)?.into_command()
    }

    #[test]
    fn test_bare_path_flashes() {
        let (config, command) = parse(&["swire-isp", "fw.bin"]).unwrap();
        assert_eq!(
            command,
            Command::Flash {
                path: PathBuf::from("fw.bin")
            }
        );
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_flash_subcommand_with_options() {
        let (config, command) =
            parse(&["swire-isp", "-p", "/dev/ttyACM0", "flash", "fw.bin", "-t", "250"]).unwrap();
        assert_eq!(
            command,
            Command::Flash {
                path: PathBuf::from("fw.bin")
            }
        );
        assert_eq!(config, Config::new("/dev/ttyACM0", 250));
    }

    #[test]
    fn test_path_and_subcommand_conflict() {
        assert!(parse(&["swire-isp", "fw.bin", "erase"]).is_err());
        assert!(parse(&["swire-isp", "erase", "fw.bin"]).is_err());
    }

    #[test]
    fn test_missing_firmware() {
        assert!(parse(&["swire-isp"]).is_err());
    }

    #[test]
    fn test_plain_subcommands() {
        assert_eq!(parse(&["swire-isp", "erase"]).unwrap().1, Command::Erase {});
        assert_eq!(parse(&["swire-isp", "reset"]).unwrap().1, Command::Reset {});
        assert_eq!(parse(&["swire-isp", "ports"]).unwrap().1, Command::Ports {});
    }
}
