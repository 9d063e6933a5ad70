// Copyright (C) 2026 Brian Johnson
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

// RF link file transfer utility
mod chunker;
mod command;
mod error;
mod frame;
mod protocol;
mod reassembly;
mod receiver;
mod sender;
mod serial;
mod sink;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serialport::{DataBits, Parity, StopBits};
use tracing_subscriber::EnvFilter;

use command::Command as LinkCommand;
use serial::{LinkPort, RealSerialPort};
use sink::DirectorySink;

#[derive(Parser)]
#[command(name = "rflink")]
#[command(about = "File transfer over an RF serial link", long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// Serial port the radio module is attached to (e.g., /dev/ttyUSB0 or COM1)
    #[arg(short, long)]
    port: String,

    /// Baud rate
    #[arg(short, long, default_value_t = protocol::DEFAULT_BAUD)]
    baud: u32,

    /// Data bits (5, 6, 7, or 8)
    #[arg(long, default_value = "8", value_name = "BITS")]
    data_bits: u8,

    /// Parity (none, odd, or even)
    #[arg(long, default_value = "none")]
    parity: String,

    /// Stop bits (1 or 2)
    #[arg(long, default_value = "1", value_name = "BITS")]
    stop_bits: u8,

    /// Tune the radio to this frequency in MHz before transferring
    #[arg(long, value_name = "MHZ")]
    frequency: Option<f32>,

    /// Enable debug output
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a file over the link
    Send {
        /// File to send
        file: PathBuf,
    },
    /// Receive files from the link
    Receive {
        /// Directory to save received files
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
}

fn parse_data_bits(bits: u8) -> Result<DataBits, String> {
    match bits {
        5 => Ok(DataBits::Five),
        6 => Ok(DataBits::Six),
        7 => Ok(DataBits::Seven),
        8 => Ok(DataBits::Eight),
        _ => Err(format!("Invalid data bits: {}. Must be 5, 6, 7, or 8", bits)),
    }
}

fn parse_parity(parity: &str) -> Result<Parity, String> {
    match parity.to_lowercase().as_str() {
        "none" => Ok(Parity::None),
        "odd" => Ok(Parity::Odd),
        "even" => Ok(Parity::Even),
        _ => Err(format!(
            "Invalid parity: {}. Must be 'none', 'odd', or 'even'",
            parity
        )),
    }
}

fn parse_stop_bits(bits: u8) -> Result<StopBits, String> {
    match bits {
        1 => Ok(StopBits::One),
        2 => Ok(StopBits::Two),
        _ => Err(format!("Invalid stop bits: {}. Must be 1 or 2", bits)),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let data_bits = match parse_data_bits(cli.data_bits) {
        Ok(db) => db,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let parity = match parse_parity(&cli.parity) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let stop_bits = match parse_stop_bits(cli.stop_bits) {
        Ok(sb) => sb,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("Opening serial port: {}", cli.port);
    println!(
        "Settings: {} baud, {:?}, {:?}, {:?}",
        cli.baud, data_bits, parity, stop_bits
    );

    let mut link = match RealSerialPort::open(&cli.port, cli.baud, data_bits, parity, stop_bits) {
        Ok(port) => port,
        Err(e) => {
            eprintln!("Failed to open serial port: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(mhz) = cli.frequency {
        if let Err(e) = link.write_line(&LinkCommand::SetFrequency(mhz).to_string()) {
            eprintln!("Failed to tune radio: {}", e);
            std::process::exit(1);
        }
    }

    match cli.command {
        Commands::Send { file } => {
            println!("\nSending file: {}", file.display());
            if let Err(e) = sender::send_file(&mut link, &file) {
                eprintln!("Send failed: {}", e);
                std::process::exit(1);
            }
            println!("\nFile sent successfully!");
        }
        Commands::Receive { output_dir } => {
            if !output_dir.exists() {
                eprintln!("Output directory not found: {}", output_dir.display());
                std::process::exit(1);
            }
            println!("\nReceiving files to: {}", output_dir.display());
            let mut sink = DirectorySink::new(output_dir);
            if let Err(e) = receiver::receive_files(Box::new(link), &mut sink) {
                eprintln!("Receive stopped: {}", e);
                std::process::exit(1);
            }
        }
    }
}
