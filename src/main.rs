mod discovery;
mod hid;
mod protocol;
mod session;
mod settings;
#[cfg(unix)]
mod signal;

use clap::Parser;
use discovery::DeviceDiscovery;
use hid::HidTransport;
use log::{debug, error, info, warn};
use protocol::encoder;
use session::dispatcher::{Dispatcher, SessionConfig, ThreadSleeper};
use session::{CancelToken, DeviceRef, DeviceResult, MIRA_PRODUCT_ID, MIRA_VENDOR_ID};
use settings::preset::{self, Preset};
use settings::{AntiFlicker, RefreshMode, SettingsRequest};
use std::process;
use std::time::Duration;

#[cfg(target_os = "linux")]
use discovery::udev_discovery::UdevDiscovery as PlatformDiscovery;
#[cfg(target_os = "windows")]
use discovery::windows_discovery::WindowsDiscovery as PlatformDiscovery;

const EXIT_INVALID: i32 = 1;
const EXIT_DEVICE_FAILED: i32 = 2;

#[derive(Parser)]
#[command(
    name = "miractl",
    about = "A tool for controlling and configuring Boox Mira displays"
)]
struct Cli {
    /// Apply a display preset; explicit options override its values
    #[arg(long, value_enum)]
    display_mode: Option<Preset>,

    #[arg(long, value_enum)]
    refresh_mode: Option<RefreshMode>,

    /// Clear the screen after the other settings are applied
    #[arg(long, conflicts_with = "no_clear")]
    clear: bool,

    /// Skip the clear a display preset would otherwise do
    #[arg(long)]
    no_clear: bool,

    #[arg(long, value_name = "1-7")]
    speed: Option<u8>,

    #[arg(long, value_name = "0-15")]
    contrast: Option<u8>,

    #[arg(long, value_name = "0-3")]
    dither_mode: Option<u8>,

    /// Must be combined with --black-filter
    #[arg(long, value_name = "0-254")]
    white_filter: Option<u8>,

    /// Must be combined with --white-filter
    #[arg(long, value_name = "0-254")]
    black_filter: Option<u8>,

    /// Cool frontlight level
    #[arg(long, value_name = "0-254")]
    cool_light: Option<u8>,

    /// Warm frontlight level
    #[arg(long, value_name = "0-254")]
    warm_light: Option<u8>,

    #[arg(long, value_enum)]
    antiflicker: Option<AntiFlicker>,

    /// Turn off both frontlights
    #[arg(long, conflicts_with_all = ["cool_light", "warm_light"])]
    lights_off: bool,

    /// Wait between light/refresh commands, overriding the panel default
    #[arg(long, value_name = "MS")]
    settle_ms: Option<u64>,

    /// Configure all panels at the same time instead of one after another
    #[arg(long)]
    parallel: bool,

    /// Print the encoded commands without touching any panel
    #[arg(long)]
    dry_run: bool,

    /// List attached panels and exit
    #[arg(short, long)]
    list: bool,

    /// Log every command and settle wait
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn settings_request(&self) -> SettingsRequest {
        let clear = if self.clear {
            Some(true)
        } else if self.no_clear {
            Some(false)
        } else {
            None
        };
        let (cool_light, warm_light) = if self.lights_off {
            (Some(0), Some(0))
        } else {
            (self.cool_light, self.warm_light)
        };

        SettingsRequest {
            refresh_mode: self.refresh_mode,
            clear,
            speed: self.speed,
            contrast: self.contrast,
            dither_mode: self.dither_mode,
            white_filter: self.white_filter,
            black_filter: self.black_filter,
            cool_light,
            warm_light,
            antiflicker: self.antiflicker,
        }
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            settle_override: self.settle_ms.map(Duration::from_millis),
            parallel: self.parallel,
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn find_panels() -> Vec<DeviceRef> {
    match PlatformDiscovery::find_panels(MIRA_VENDOR_ID, MIRA_PRODUCT_ID) {
        Ok(devices) => devices,
        Err(e) => {
            error!("Unable to find Boox Mira panels: {}", e);
            process::exit(EXIT_INVALID);
        }
    }
}

#[cfg(unix)]
fn install_interrupt_handler(cancel: &CancelToken) {
    if let Err(e) = signal::cancel_on_interrupt(cancel) {
        warn!("Ctrl-C will not stop sessions cleanly: {}", e);
    }
}

#[cfg(not(unix))]
fn install_interrupt_handler(_cancel: &CancelToken) {}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list {
        for device in find_panels() {
            println!("{}", device);
        }
        return;
    }

    let settings = match preset::resolve(cli.display_mode, &cli.settings_request()) {
        Ok(s) => s,
        Err(e) => {
            error!("Invalid settings: {}", e);
            process::exit(EXIT_INVALID);
        }
    };
    if let Some(preset) = cli.display_mode {
        info!("Using display preset {}", preset);
    }

    let commands = encoder::encode(&settings);
    if commands.is_empty() {
        warn!("Nothing to apply; pass --display-mode or at least one setting");
        return;
    }
    for command in &commands {
        debug!("Encoded {}", command);
    }

    if cli.dry_run {
        for command in &commands {
            println!("{}", command);
        }
        return;
    }

    let devices = find_panels();
    info!("Found {} panel(s)", devices.len());

    let cancel = CancelToken::new();
    install_interrupt_handler(&cancel);

    let transport = HidTransport;
    let sleeper = ThreadSleeper;
    let dispatcher = Dispatcher::new(&transport, &sleeper, cli.session_config(), cancel);
    let results = dispatcher.dispatch(devices, &commands);

    for result in &results {
        println!("{}", result);
    }

    let unconfigured: Vec<&DeviceRef> = results
        .iter()
        .filter(|r| !r.is_applied())
        .map(DeviceResult::device)
        .collect();
    if !unconfigured.is_empty() {
        error!(
            "{} of {} panel(s) not fully configured",
            unconfigured.len(),
            results.len()
        );
        process::exit(EXIT_DEVICE_FAILED);
    }
}
