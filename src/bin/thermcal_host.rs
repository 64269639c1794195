//! Thermistor Calibrator Host Terminal
//!
//! This binary runs on your PC and talks to a board running the calibrator
//! over its serial console.
//!
//! ## Usage
//!
//! ```bash
//! # List available serial ports
//! cargo run --bin thermcal_host -- --list-ports
//!
//! # Connect to device (auto-detects common Arduino / RP boards)
//! cargo run --bin thermcal_host
//!
//! # Connect to specific port
//! cargo run --bin thermcal_host -- --port COM3 --baud 19200
//! ```
//!
//! ## Session
//!
//! Type a reference temperature and press enter for each row, `#` to finish
//! and get the fit. `exit` quits without finishing. The terminal closes by
//! itself once the device prints its final report line.

use std::io::{self, BufRead, Read, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use thermcal::protocol::{classify_line, DeviceLine};

/// USB vendor ids of boards the calibrator usually runs on
const KNOWN_VIDS: [(u16, &str); 5] = [
    (0x2341, "Arduino"),
    (0x2a03, "Arduino (.org)"),
    (0x0403, "FTDI"),
    (0x1a86, "CH340"),
    (0x2e8a, "Raspberry Pi"),
];

#[derive(Parser, Debug)]
#[command(
    name = "thermcal_host",
    about = "Serial terminal for the thermistor calibrator"
)]
struct Cli {
    /// List serial ports and exit
    #[arg(long)]
    list_ports: bool,
    /// Serial port (auto-detected when omitted)
    #[arg(long)]
    port: Option<String>,
    /// Baud rate of the device console
    #[arg(long, default_value_t = 19200)]
    baud: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list_ports {
        list_ports();
        return Ok(());
    }

    let Some(port_name) = cli.port.or_else(find_device_port) else {
        eprintln!("Error: No calibrator device found");
        eprintln!("Use --list-ports to see available ports");
        eprintln!("Or specify port with --port <PORT>");
        bail!("no device found");
    };

    // On Windows, COM ports >= 10 need the \\.\COMxx format
    #[cfg(target_os = "windows")]
    let port_name = if port_name.starts_with("COM") && !port_name.starts_with(r"\\") {
        format!(r"\\.\{}", port_name)
    } else {
        port_name
    };

    print!("Connecting to {} at {} baud...", port_name, cli.baud);
    io::stdout().flush()?;

    let mut port = serialport::new(&port_name, cli.baud)
        .timeout(Duration::from_millis(50))
        .flow_control(serialport::FlowControl::None)
        .open()
        .with_context(|| format!("opening {}", port_name))?;

    println!(" opened!");

    // Set DTR (Data Terminal Ready) - some boards wait for this, most Arduinos reset on it
    port.write_data_terminal_ready(true)?;
    println!("Connected! Waiting for the device banner...\n");

    let operator = spawn_stdin_reader();
    let finished = run_terminal(&mut port, &operator)?;

    if finished {
        println!("\nSession complete.");
    } else {
        println!("\nGoodbye!");
    }
    Ok(())
}

/// Pump device output to the terminal and operator lines to the device
///
/// Returns `true` when the device reported the end of its session.
fn run_terminal(
    port: &mut Box<dyn serialport::SerialPort>,
    operator: &Receiver<String>,
) -> Result<bool> {
    let mut rx_line: Vec<u8> = Vec::new();
    let mut byte = [0u8; 64];

    loop {
        match port.read(&mut byte) {
            Ok(n) => {
                for &b in &byte[..n] {
                    match b {
                        b'\n' => {
                            let line = String::from_utf8_lossy(&rx_line).into_owned();
                            rx_line.clear();
                            println!("{}", line);
                            if handle_device_line(&line) {
                                return Ok(true);
                            }
                        }
                        b'\r' => {}
                        b => rx_line.push(b),
                    }
                }
            }
            Err(ref e) if e.kind() == io::ErrorKind::TimedOut => {}
            Err(e) => return Err(e).context("reading from device"),
        }

        match operator.try_recv() {
            Ok(line) => {
                let line = line.trim();
                if line == "exit" || line == "quit" {
                    return Ok(false);
                }
                log::debug!("sending {:?}", line);
                port.write_all(line.as_bytes())?;
                port.write_all(b"\n")?;
                port.flush()?;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => return Ok(false),
        }
    }
}

fn handle_device_line(line: &str) -> bool {
    let kind = classify_line(line);
    match kind {
        DeviceLine::Banner => log::info!("device started a session"),
        DeviceLine::Row { index } => log::debug!("device stored row {}", index),
        DeviceLine::Empty => log::warn!("device collected no readings"),
        _ => {}
    }
    kind.ends_session()
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

fn list_ports() {
    println!("Available serial ports:");
    match serialport::available_ports() {
        Ok(ports) => {
            if ports.is_empty() {
                println!("  (none)");
            }
            for port in ports {
                print!("  {}", port.port_name);
                match &port.port_type {
                    serialport::SerialPortType::UsbPort(info) => {
                        print!(" - USB (VID: 0x{:04x}, PID: 0x{:04x})", info.vid, info.pid);
                        match board_name(info.vid) {
                            Some(name) => println!(" [{}]", name),
                            None => println!(),
                        }
                        if let Some(ref manufacturer) = info.manufacturer {
                            println!("      Manufacturer: {}", manufacturer);
                        }
                        if let Some(ref product) = info.product {
                            println!("      Product: {}", product);
                        }
                    }
                    other => println!(" - {}", port_type_name(other)),
                }
            }
        }
        Err(e) => {
            eprintln!("Error listing ports: {}", e);
        }
    }
}

fn port_type_name(port_type: &serialport::SerialPortType) -> &str {
    match port_type {
        serialport::SerialPortType::UsbPort(_) => "USB",
        serialport::SerialPortType::BluetoothPort => "Bluetooth",
        serialport::SerialPortType::PciPort => "PCI",
        serialport::SerialPortType::Unknown => "Unknown",
    }
}

fn board_name(vid: u16) -> Option<&'static str> {
    KNOWN_VIDS
        .iter()
        .find(|(known, _)| *known == vid)
        .map(|(_, name)| *name)
}

fn find_device_port() -> Option<String> {
    let ports = serialport::available_ports().ok()?;

    ports.into_iter().find_map(|port| match &port.port_type {
        serialport::SerialPortType::UsbPort(info) if board_name(info.vid).is_some() => {
            log::info!("auto-detected {} on {}", board_name(info.vid)?, port.port_name);
            Some(port.port_name)
        }
        _ => None,
    })
}
