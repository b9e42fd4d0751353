//! Standalone harness for the nutpoll driver.
//!
//! Runs the poller outside the collection host and prints each record — handy
//! for checking a NUT setup before wiring the driver into the host.

use std::process::exit;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use nutpoll_core::{DriverConfig, ObservationRecord, StreamingDriver, loader};

#[derive(Parser)]
#[command(name = "nutpoll")]
#[command(about = "nutpoll — poll UPS/PDU readings through Network UPS Tools")]
#[command(disable_version_flag = true)]
struct Cli {
    /// Display driver version
    #[arg(long)]
    version: bool,

    /// Display diagnostic information while running
    #[arg(long)]
    debug: bool,

    /// Device identifier passed to the query command (name[@host[:port]])
    #[arg(long, default_value = nutpoll_core::config::DEFAULT_DEVICE)]
    device: String,

    /// Query command with options
    #[arg(long, default_value = nutpoll_core::config::DEFAULT_CMD)]
    cmd: String,

    /// Seconds between polls
    #[arg(long = "poll-interval", default_value_t = nutpoll_core::config::DEFAULT_POLL_INTERVAL_SECS)]
    poll_interval: u64,

    /// Value prepended to PATH for the query command
    #[arg(long)]
    path: Option<String>,

    /// Value for LD_LIBRARY_PATH
    #[arg(long = "ld_library_path")]
    ld_library_path: Option<String>,

    /// Tail a long-lived client process instead of polling
    #[arg(long)]
    stream: bool,

    /// Print records as JSON instead of the flat text form
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.version {
        println!("nutpoll driver version {}", nutpoll_core::VERSION);
        exit(1);
    }

    let level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = DriverConfig {
        device: cli.device,
        cmd: cli.cmd,
        poll_interval: cli.poll_interval,
        path: cli.path,
        ld_library_path: cli.ld_library_path,
        ..DriverConfig::default()
    };

    // Ctrl+C ends the loop at the next record or flush
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || r.store(false, Ordering::SeqCst)) {
        eprintln!("Error setting Ctrl+C handler: {e}");
    }

    let code = if cli.stream {
        run_stream(config, &running, cli.json)
    } else {
        run_poll(config, &running, cli.json)
    };
    exit(code);
}

fn print_record(record: &ObservationRecord, json: bool) {
    if json {
        match serde_json::to_string(record) {
            Ok(line) => println!("{line}"),
            Err(e) => eprintln!("Error serializing record: {e}"),
        }
    } else {
        println!("{record}");
    }
}

fn run_poll(config: DriverConfig, running: &AtomicBool, json: bool) -> i32 {
    let mut driver = match loader(config) {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let mut code = 0;
    for record in driver.records() {
        match record {
            Ok(record) => print_record(&record, json),
            Err(e) => {
                eprintln!("Error: {e}");
                code = 1;
                break;
            }
        }
        if !running.load(Ordering::SeqCst) {
            break;
        }
    }
    driver.close();
    code
}

fn run_stream(config: DriverConfig, running: &AtomicBool, json: bool) -> i32 {
    let mut driver = match StreamingDriver::new(config) {
        Ok(driver) => driver,
        Err(e) => {
            eprintln!("Error: {e}");
            return 1;
        }
    };

    let mut code = 0;
    for record in driver.records() {
        match record {
            Ok(record) => print_record(&record, json),
            Err(e) => {
                eprintln!("Error: {e}");
                code = 1;
                break;
            }
        }
        if !running.load(Ordering::SeqCst) {
            break;
        }
    }
    driver.close();
    code
}
