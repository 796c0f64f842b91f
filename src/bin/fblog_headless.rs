//! fblog Headless Renderer
//!
//! Feeds text into a fresh log buffer and renders it into an in-memory
//! surface, the same way a crash would render into a framebuffer.
//! Writes the result as a binary PPM image, or as raw surface bytes.

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use fblog::{BuiltinFonts, Config, Geometry, LogState, PixelFormat, SafetyMode, Surface};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Parse command line arguments
    let mut width = 800usize;
    let mut height = 600usize;
    let mut columns = 1usize;
    let mut format = PixelFormat::XRGB8888;
    let mut input_file: Option<PathBuf> = None;
    let mut output_file: Option<PathBuf> = None;
    let mut config_file: Option<PathBuf> = None;
    let mut output_format = OutputFormat::Ppm;
    let mut banner = false;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-W" | "--width" => {
                i += 1;
                if i < args.len() {
                    width = args[i].parse().unwrap_or(800);
                }
            },
            "-H" | "--height" => {
                i += 1;
                if i < args.len() {
                    height = args[i].parse().unwrap_or(600);
                }
            },
            "-c" | "--columns" => {
                i += 1;
                if i < args.len() {
                    columns = args[i].parse().unwrap_or(1);
                }
            },
            "-f" | "--format" => {
                i += 1;
                if i < args.len() {
                    match args[i].parse() {
                        Ok(parsed) => format = parsed,
                        Err(e) => {
                            eprintln!("Error: {}", e);
                            return ExitCode::FAILURE;
                        },
                    }
                }
            },
            "-i" | "--input" => {
                i += 1;
                if i < args.len() {
                    input_file = Some(PathBuf::from(&args[i]));
                }
            },
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_file = Some(PathBuf::from(&args[i]));
                }
            },
            "--config" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(PathBuf::from(&args[i]));
                }
            },
            "--raw" => {
                output_format = OutputFormat::Raw;
            },
            "--banner" => {
                banner = true;
            },
            "-h" | "--help" => {
                show_help = true;
            },
            _ => {
                // Treat as input file if no flag
                if input_file.is_none() && !args[i].starts_with('-') {
                    input_file = Some(PathBuf::from(&args[i]));
                }
            },
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let config = match &config_file {
        Some(path) => match Config::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => Config::load_or_default(),
    };

    // Read input
    let input_data = match &input_file {
        Some(path) => match std::fs::read(path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None if banner => Vec::new(),
        None => {
            // Read from stdin
            let mut data = Vec::new();
            if let Err(e) = io::stdin().read_to_end(&mut data) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            data
        },
    };

    let state = LogState::new(config);
    if !state.init(&BuiltinFonts) {
        eprintln!("Error: no usable font");
        return ExitCode::FAILURE;
    }
    if let Err(e) = state.ensure_size(width, height) {
        eprintln!("Error sizing log buffer: {}", e);
        return ExitCode::FAILURE;
    }
    state.write(&input_data, SafetyMode::Locked);

    // Render
    let cpp = format.bytes_per_pixel().unwrap_or(0);
    let geometry = Geometry::new(width, height, width * cpp, cpp, format, columns);
    let mut pixels = vec![0u8; width * height * cpp];
    let mut surface = match Surface::new(&mut pixels, geometry) {
        Ok(surface) => surface,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        },
    };

    if banner {
        state.draw_panic_screen(&mut surface);
    } else {
        state.draw(&mut surface);
    }
    tracing::debug!("Rendered {}x{} {} surface", width, height, format);

    // Output result
    let result = match &output_file {
        Some(path) => File::create(path).and_then(|file| {
            let mut out = BufWriter::new(file);
            write_output(&mut out, &surface, output_format)?;
            out.flush()
        }),
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_output(&mut out, &surface, output_format).and_then(|_| out.flush())
        },
    };

    if let Err(e) = result {
        eprintln!("Error writing output: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Ppm,
    Raw,
}

fn write_output(
    out: &mut dyn Write,
    surface: &Surface<'_>,
    format: OutputFormat,
) -> io::Result<()> {
    match format {
        OutputFormat::Raw => out.write_all(surface.pixels()),
        OutputFormat::Ppm => {
            let (width, height) = (surface.width(), surface.height());
            write!(out, "P6\n{} {}\n255\n", width, height)?;
            let pixel_format = surface.format();
            for y in 0..height {
                for x in 0..width {
                    let color = surface
                        .pixel(x, y)
                        .and_then(|bytes| pixel_format.decode(bytes))
                        .unwrap_or_default();
                    out.write_all(&color.to_rgb8())?;
                }
            }
            Ok(())
        },
    }
}

fn print_help() {
    println!("fblog Headless Renderer");
    println!();
    println!("Usage: fblog-headless [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -W, --width <N>      Surface width in pixels (default: 800)");
    println!("  -H, --height <N>     Surface height in pixels (default: 600)");
    println!("  -c, --columns <N>    Number of log columns (default: 1)");
    println!("  -f, --format <NAME>  Pixel format, e.g. XRGB8888, RGB565_BE (default: XRGB8888)");
    println!("  -i, --input <PATH>   Read log text from file (default: stdin)");
    println!("  -o, --output <PATH>  Write output to file (default: stdout)");
    println!("      --config <PATH>  Load JSON configuration");
    println!("      --raw            Write raw surface bytes instead of PPM");
    println!("      --banner         Render the static panic screen instead of the log");
    println!("  -h, --help           Show this help message");
    println!();
    println!("Environment:");
    println!("  RUST_LOG             Log filter for diagnostics on stderr (default: warn)");
}
