mod demo;

use clap::{Parser, Subcommand};
use tracing::info;

use visor_core::config::{default_config_path, VisorConfig};
use visor_protocol::wire;

#[derive(Parser)]
#[command(name = "visor")]
#[command(about = "Visor - software command-buffer replay")]
#[command(version)]
struct Cli {
    /// Configuration file path (defaults to /etc/visor/visor.toml, then ./visor.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record and replay the textured-cube frame into an offscreen image
    Demo {
        /// Texture to upload (binary PPM)
        #[arg(short, long)]
        texture: Option<String>,

        /// Where to write the rendered target (binary PPM)
        #[arg(short, long, default_value = "frame.ppm")]
        output: String,

        /// Also write the frame's command stream as a capture file
        #[arg(long)]
        capture: Option<String>,

        /// Target width and height in pixels
        #[arg(long, default_value_t = 500)]
        size: u32,
    },

    /// Decode a capture file and list its records
    Inspect {
        /// Capture file
        file: String,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a pixel map and report its dimensions
    Texture {
        /// Binary PPM file
        file: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    visor_common::init_logging(visor_common::verbosity_directive(cli.verbose));

    let config_path = cli.config.unwrap_or_else(default_config_path);
    let config = VisorConfig::load_or_default(&config_path);

    match cli.command {
        Commands::Demo {
            texture,
            output,
            capture,
            size,
        } => {
            info!("running demo frame ({}x{})", size, size);
            let opts = demo::DemoOptions {
                texture,
                output,
                capture,
                size,
            };
            demo::run_demo(&config, &opts)?;
        }

        Commands::Inspect { file, json } => {
            let bytes = std::fs::read(&file)?;
            let capture = wire::decode_capture(&bytes)?;

            let records = capture.records()?;

            if json {
                let commands: Vec<_> = records.into_iter().map(|(_, cmd)| cmd).collect();
                println!("{}", serde_json::to_string_pretty(&commands)?);
                return Ok(());
            }

            println!(
                "{}: {} record(s), {} byte stream{}",
                file,
                capture.record_count,
                capture.stream.len(),
                if capture.flags.contains(wire::CaptureFlags::COMPRESSED) {
                    " (lz4)"
                } else {
                    ""
                }
            );
            println!();
            for (offset, cmd) in &records {
                println!("  {:>8}  {:?}", offset, cmd);
            }
        }

        Commands::Texture { file } => {
            let pixmap = visor_core::pixmap::load_pixmap(&file, config.pixmap.max_dimension)?;
            println!(
                "{}: {}x{} ({} bytes RGBA)",
                file,
                pixmap.width,
                pixmap.height,
                pixmap.rgba.len()
            );
        }
    }

    Ok(())
}
