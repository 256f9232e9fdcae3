//! ScrollRelay - Split-screen scroll relay
//!
//! Continues scrolled content across adjacent display regions.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use scrollrelay::config::{self, Config, DEFAULT_OVERLAP_HEIGHT, DEFAULT_SCROLL_TRIGGER_THRESHOLD};
use scrollrelay::host::{ChannelScrollSource, RawScrollEvent, RawScrollKind, SimulatedHost, SimulatedWindow};
use scrollrelay::relay::{normalize, RelayState, ScrollDirection, ScrollEventRouter, SCROLL_UNITS_PER_LINE, WHEEL_DELTA};
use scrollrelay::screen::{RawDisplayDescriptor, Rect};
use scrollrelay::service::{RelayEvent, RelayService};

/// ScrollRelay - Split-screen scroll relay
#[derive(Parser)]
#[command(name = "scrollrelay")]
#[command(author = "ScrollRelay Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Continue scrolled content across adjacent display regions", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration
    Config {
        /// Generate sample configuration
        #[arg(long)]
        generate: bool,

        /// Output path for generated config
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Split the configured displays and show regions with their neighbors
    Topology,

    /// Decide a single scroll event and print the command as JSON
    Evaluate {
        /// Owning application (process name)
        #[arg(short, long)]
        app: String,

        /// Window title
        #[arg(short, long, default_value = "")]
        title: String,

        /// Display the window sits on
        #[arg(short, long, default_value = "DISPLAY1")]
        display: String,

        /// Current scroll position
        #[arg(short, long)]
        position: i32,

        /// Total content extent
        #[arg(short, long)]
        extent: i32,

        /// Viewport height (defaults to the window height)
        #[arg(long)]
        client_height: Option<i32>,

        /// Scroll direction (up or down)
        #[arg(long, default_value = "down")]
        direction: ScrollDirection,

        #[arg(long, requires_all = ["window_y", "window_width", "window_height"])]
        window_x: Option<i32>,
        #[arg(long)]
        window_y: Option<i32>,
        #[arg(long)]
        window_width: Option<i32>,
        #[arg(long)]
        window_height: Option<i32>,
    },

    /// Scroll a simulated reader through every region and show the hand-offs
    Simulate {
        /// Application the simulated windows belong to
        #[arg(short, long, default_value = "sumatrapdf")]
        app: String,

        /// Wheel notches to scroll down
        #[arg(short, long, default_value_t = 200)]
        notches: u32,

        /// Content extent of every simulated window
        #[arg(long, default_value_t = 3000)]
        content_extent: i32,
    },

    /// Show defaults and unit constants
    Info,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        Config::load(config_path)?
    } else {
        Config::load_default().unwrap_or_default()
    };

    match cli.command {
        Commands::Config { generate, output } => {
            if generate {
                let sample = config::generate_sample_config()?;
                if let Some(path) = output {
                    std::fs::write(&path, &sample)?;
                    println!("Configuration written to: {}", path.display());
                } else {
                    println!("{}", sample);
                }
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
        Commands::Topology => {
            print_topology(&config)?;
        }
        Commands::Evaluate {
            app,
            title,
            display,
            position,
            extent,
            client_height,
            direction,
            window_x,
            window_y,
            window_width,
            window_height,
        } => {
            let bounds = match (window_x, window_y, window_width, window_height) {
                (Some(x), Some(y), Some(w), Some(h)) => Some(Rect::new(x, y, w, h)),
                _ => None,
            };
            let window = EvaluatedWindow {
                app,
                title,
                display,
                bounds,
                position,
                extent,
                client_height,
            };
            evaluate(&config, window, direction)?;
        }
        Commands::Simulate {
            app,
            notches,
            content_extent,
        } => {
            simulate(&config, &app, notches, content_extent)?;
        }
        Commands::Info => {
            print_info();
        }
    }

    Ok(())
}

/// Displays the simulated host reports
fn configured_displays(config: &Config) -> Vec<RawDisplayDescriptor> {
    if config.displays.is_empty() {
        vec![RawDisplayDescriptor::new("DISPLAY1", Rect::new(0, 0, 1920, 1080))]
    } else {
        config.displays.clone()
    }
}

/// Build a service over a simulated host with the configured displays
fn simulated_service(config: &Config) -> anyhow::Result<(RelayService, Arc<SimulatedHost>)> {
    let state = RelayState::new(config.topology(), config.policy_store(), config.relay.clone());
    let host = Arc::new(SimulatedHost::with_displays(configured_displays(config)));
    let (source, _tx) = ChannelScrollSource::new(1);

    let service = RelayService::new(state, host.clone(), Box::new(source));
    service
        .refresh_displays()
        .context("Failed to build display topology")?;
    Ok((service, host))
}

fn print_topology(config: &Config) -> anyhow::Result<()> {
    let (service, _host) = simulated_service(config)?;
    let topology = service.state().topology();

    println!("Display Topology ({} region(s))", topology.len());
    println!("==========================\n");

    for region in topology.regions() {
        let b = region.bounds;
        println!(
            "{} [{}x{} at {},{}] display={} split={:?} relay={}",
            region.id, b.width, b.height, b.x, b.y, region.display_id, region.split_type, region.relay_enabled
        );

        let mut neighbors: Vec<_> = region.neighbors.iter().collect();
        neighbors.sort();
        for (edge, id) in neighbors {
            println!("  {:<6} -> {}", edge, id);
        }
        println!(
            "  scroll down continues via the {} edge",
            region.next_edge()
        );
    }

    Ok(())
}

/// A window described on the command line
struct EvaluatedWindow {
    app: String,
    title: String,
    display: String,
    bounds: Option<Rect>,
    position: i32,
    extent: i32,
    client_height: Option<i32>,
}

fn evaluate(config: &Config, window: EvaluatedWindow, direction: ScrollDirection) -> anyhow::Result<()> {
    let (service, host) = simulated_service(config)?;

    // Without explicit bounds the window fills the first pane of its display
    let bounds = match window.bounds {
        Some(bounds) => bounds,
        None => service
            .state()
            .topology()
            .regions()
            .find(|r| r.display_id == window.display)
            .map(|r| r.bounds)
            .with_context(|| format!("Unknown display '{}'", window.display))?,
    };

    let id = host.open_window(SimulatedWindow {
        app_key: window.app,
        title: window.title,
        display_id: window.display,
        bounds,
        position: window.position,
        client_height: window.client_height.unwrap_or(bounds.height),
        content_extent: window.extent,
    });

    let delta = match direction {
        ScrollDirection::Up => WHEEL_DELTA,
        ScrollDirection::Down => -WHEEL_DELTA,
    };

    let router = ScrollEventRouter::new(service.state().clone(), host.clone(), host);
    let command = router.on_scroll(&RawScrollEvent::wheel(id, delta));

    println!("{}", serde_json::to_string_pretty(&command)?);
    Ok(())
}

fn simulate(config: &Config, app: &str, notches: u32, content_extent: i32) -> anyhow::Result<()> {
    let (service, host) = simulated_service(config)?;

    // One reader window per region, all at the top of the content
    let windows: Vec<_> = service
        .state()
        .topology()
        .regions()
        .map(|region| {
            host.open_window(SimulatedWindow {
                app_key: app.to_string(),
                title: format!("{} - {}", app, region.id),
                display_id: region.display_id.clone(),
                bounds: region.bounds,
                position: 0,
                client_height: region.bounds.height,
                content_extent,
            })
        })
        .collect();

    let Some(&first) = windows.first() else {
        anyhow::bail!("No regions to simulate");
    };

    let (_, units) = normalize(&RawScrollKind::Wheel { delta: -WHEEL_DELTA })
        .context("Wheel notch did not normalize")?;
    let step = i32::try_from(units)?;

    println!(
        "Scrolling {} notch(es) of {} unit(s) through {} window(s)\n",
        notches,
        units,
        windows.len()
    );

    let mut current = first;
    let mut handoffs = 0;

    for notch in 1..=notches {
        host.scroll_by(current, step)?;

        match service.process(&RawScrollEvent::wheel(current, -WHEEL_DELTA)) {
            Some(RelayEvent::HandoffApplied {
                target_window,
                ref target_region,
                position,
                ..
            }) => {
                handoffs += 1;
                println!(
                    "notch {:>4}: window {} -> window {} in {} at {}",
                    notch, current, target_window, target_region, position
                );
                current = target_window;
            }
            Some(event) => {
                println!("notch {:>4}: {}", notch, serde_json::to_string(&event)?);
            }
            None => {}
        }
    }

    println!("\n{} hand-off(s)", handoffs);
    for id in windows {
        if let Some(window) = host.window(id) {
            println!(
                "  window {} ({}): position {} of {}",
                id,
                window.title,
                window.position,
                window.max_position()
            );
        }
    }

    Ok(())
}

/// Print defaults and unit constants
fn print_info() {
    println!("ScrollRelay Information");
    println!("=======================\n");

    println!("Default overlap height: {} units", DEFAULT_OVERLAP_HEIGHT);
    println!("Default trigger threshold: {} units", DEFAULT_SCROLL_TRIGGER_THRESHOLD);
    println!("Default split ratio: {}", config::DEFAULT_SPLIT_RATIO);
    println!("\nWheel delta per notch: {}", WHEEL_DELTA);
    println!("Scroll units per line: {}", SCROLL_UNITS_PER_LINE);

    if let Some(dir) = dirs::config_dir() {
        println!("\nConfig file: {}", dir.join("scrollrelay/config.toml").display());
    }
}
