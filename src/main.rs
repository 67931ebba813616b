/***************************************/
/*        3rd party libraries          */
/***************************************/
use clap::Parser;
use log::{info, warn};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, Builder};
use std::time::Duration;

/***************************************/
/*           Local modules             */
/***************************************/
use elevator_bank::config::{load_config, ElevatorKind};
use elevator_bank::dispatch::Dispatch;
use elevator_bank::menu::Menu;
use elevator_bank::shared::CancelSource;
use elevator_bank::traffic::TrafficGenerator;
use elevator_bank::unwrap_or_exit;

/// Simulates a bank of elevators driven from a text menu or random traffic.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Configuration file
    #[clap(long, default_value = "config.toml")]
    config: PathBuf,

    /// Number of elevators, overrides the configuration file
    #[clap(long)]
    elevators: Option<usize>,

    /// Elevator model preset, overrides capacity and speed
    #[clap(long, value_enum)]
    kind: Option<ElevatorKind>,

    /// Submit random traffic on startup
    #[clap(long)]
    traffic: bool,

    /// Seed for the traffic generator
    #[clap(long)]
    seed: Option<u64>,

    /// Run without the menu for this many seconds
    #[clap(long)]
    headless: Option<u64>,
}

/* Main */
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    // Load the configuration and apply command line overrides
    let mut config = unwrap_or_exit!(load_config(&args.config), "Failed to load configuration");
    if let Some(count) = args.elevators {
        config.system.elevator_count = count;
    }
    if let Some(kind) = args.kind {
        config.elevator = kind.config();
    }
    if args.seed.is_some() {
        config.traffic.seed = args.seed;
    }
    unwrap_or_exit!(config.validate(), "Invalid configuration");

    // Boot the elevators and start their control loops
    let dispatch = Arc::new(unwrap_or_exit!(
        Dispatch::boot(config.system.elevator_count, &config.elevator),
        "Failed to boot elevators"
    ));
    let mut cancel_source = CancelSource::new();
    let elevator_threads = unwrap_or_exit!(
        dispatch.start_all(&cancel_source.token()),
        "Failed to start elevators"
    );

    // Start the traffic generator
    let traffic_thread = if args.traffic || config.system.run_traffic_on_startup {
        let dispatch = Arc::clone(&dispatch);
        let cancel = cancel_source.token();
        let mut generator = TrafficGenerator::new(config.traffic.clone());
        let spawned = Builder::new()
            .name("traffic".into())
            .spawn(move || generator.generate(&dispatch, &cancel));
        Some(unwrap_or_exit!(spawned, "Failed to start traffic"))
    } else {
        None
    };

    // Hand control to the operator, or just let the simulation run
    match args.headless {
        Some(seconds) => {
            info!("Running headless for {} seconds.", seconds);
            thread::sleep(Duration::from_secs(seconds));
        }
        None => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut menu = Menu::new(&dispatch, stdin.lock(), stdout.lock());
            if let Err(e) = menu.run() {
                warn!("Menu stopped: {}", e);
            }
        }
    }

    // Shut everything down
    info!("Exiting the system.");
    cancel_source.cancel();
    if let Some(traffic_thread) = traffic_thread {
        if traffic_thread.join().is_err() {
            warn!("Traffic thread panicked");
        }
    }
    for (id, elevator_thread) in elevator_threads {
        match elevator_thread.join() {
            Ok(reason) => info!("[Elevator #{}] Stopped: {:?}.", id, reason),
            Err(_) => warn!("[Elevator #{}] Control loop panicked.", id),
        }
    }

    match serde_json::to_string_pretty(&dispatch.statuses()) {
        Ok(statuses) => info!("Final statuses:\n{}", statuses),
        Err(e) => warn!("Failed to serialize final statuses: {}", e),
    }
}
