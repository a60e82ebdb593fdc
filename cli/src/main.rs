mod program;

use clap::{Args, Parser, Subcommand};
use csave_core::{capture_blocks, Record, Session, SessionConfig, BITS_PER_FRAME};
use hound::{SampleFormat, WavSpec};
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use program::{program_for_data, Overrides, ProgramFile};

#[derive(Parser)]
#[command(name = "csave")]
#[command(about = "Cassette-style FSK tone generator for byte records")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render data as CSAVE tones into a WAV file
    Render {
        #[command(flatten)]
        source: Source,

        /// Output WAV file
        #[arg(short, long, value_name = "OUTPUT.WAV")]
        output: PathBuf,

        /// Number of output channels (the tone is duplicated into each)
        #[arg(short, long, default_value = "1")]
        channels: u16,

        /// Write 32-bit float samples instead of 16-bit PCM
        #[arg(long)]
        float: bool,
    },

    /// Print the record layout and stream length without rendering
    Info {
        #[command(flatten)]
        source: Source,
    },
}

#[derive(Args)]
struct Source {
    /// Input data file ("-" for stdin), written after the CSAVE header record
    #[arg(value_name = "INPUT", required_unless_present = "program")]
    input: Option<PathBuf>,

    /// JSON program file listing the records and session settings
    #[arg(short, long, value_name = "PROGRAM.JSON", conflicts_with = "input")]
    program: Option<PathBuf>,

    /// Symbol rate in baud (default: 1200)
    #[arg(short, long)]
    symbol_rate: Option<f64>,

    /// Output sample rate in Hz (default: 48000)
    #[arg(short = 'r', long)]
    sample_rate: Option<f64>,

    /// Samples rendered per block (default: 128)
    #[arg(short, long)]
    block_size: Option<usize>,
}

impl Source {
    fn overrides(&self) -> Overrides {
        Overrides {
            sample_rate: self.sample_rate,
            symbol_rate: self.symbol_rate,
            block_size: self.block_size,
        }
    }

    fn load(&self) -> Result<(SessionConfig, Arc<[Record]>), Box<dyn std::error::Error>> {
        if let Some(path) = &self.program {
            let program = ProgramFile::load(path)?;
            info!("Loaded {} records from {}", program.records.len(), path.display());
            return Ok((program.config(self.overrides()), program.records()?));
        }

        let path = self.input.as_deref().ok_or("no input given")?;
        let data = read_input(path)?;
        info!("Read {} bytes from {}", data.len(), path.display());
        Ok(program_for_data(&data, self.overrides()))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            source,
            output,
            channels,
            float,
        } => render_command(&source, &output, channels, float)?,
        Commands::Info { source } => info_command(&source)?,
    }

    Ok(())
}

fn read_input(path: &Path) -> std::io::Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut data = Vec::new();
        std::io::stdin().read_to_end(&mut data)?;
        Ok(data)
    } else {
        std::fs::read(path)
    }
}

fn render_command(
    source: &Source,
    output_path: &Path,
    channels: u16,
    float: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if channels == 0 {
        return Err("at least one output channel is required".into());
    }

    // Read input and build the records
    let (config, records) = source.load()?;
    // Configuration errors surface here, before the output file exists
    let mut session = Session::configure(config, records)?;

    if config.sample_rate.fract() != 0.0 || config.sample_rate > u32::MAX as f64 {
        return Err(format!("WAV needs a whole-number sample rate, got {}", config.sample_rate).into());
    }

    // Write WAV file (16-bit PCM or 32-bit float)
    let spec = WavSpec {
        channels,
        sample_rate: config.sample_rate as u32,
        bits_per_sample: if float { 32 } else { 16 },
        sample_format: if float {
            SampleFormat::Float
        } else {
            SampleFormat::Int
        },
    };

    let file = BufWriter::new(File::create(output_path)?);
    let mut writer = hound::WavWriter::new(file, spec)?;

    info!(
        "Rendering {} samples at {} baud ({:.2} s)",
        session.total_samples(),
        config.symbol_rate,
        session.total_samples() as f64 / config.sample_rate
    );

    // Render block by block straight into the writer
    let frames = capture_blocks(&mut session, usize::from(channels), |block| {
        for k in 0..block[0].len() {
            for channel in block {
                if float {
                    writer.write_sample(channel[k])?;
                } else {
                    // Clamp to [-1.0, 1.0] range to avoid overflow, then scale to i16
                    let clamped = channel[k].clamp(-1.0, 1.0);
                    writer.write_sample((clamped * 32767.0) as i16)?;
                }
            }
        }
        Ok::<(), hound::Error>(())
    })?;
    writer.finalize()?;

    debug!("session state after render: {:?}", session.state());
    println!(
        "Wrote {} frames ({} channels, {} bits) to {}",
        frames,
        spec.channels,
        spec.bits_per_sample,
        output_path.display()
    );
    Ok(())
}

fn info_command(source: &Source) -> Result<(), Box<dyn std::error::Error>> {
    // Read input and check it against the session settings
    let (config, records) = source.load()?;
    config.validate_records(&records)?;

    println!(
        "{} Hz, {} baud, {} samples/bit, tones {} / {} Hz",
        config.sample_rate,
        config.symbol_rate,
        config.samples_per_symbol(),
        config.space_frequency,
        config.mark_frequency
    );

    // One line per record: leader, payload and symbol counts
    for (index, record) in records.iter().enumerate() {
        let symbols = 1 + record.payload().len() * BITS_PER_FRAME;
        println!(
            "record {}: {:.3} s leader, {} bytes, {} symbols, {} samples",
            index,
            record.preamble_seconds(),
            record.payload().len(),
            symbols,
            config.record_samples(record)
        );
    }

    println!(
        "total: {} samples ({:.3} s)",
        config.total_samples(&records),
        config.duration_seconds(&records)
    );
    Ok(())
}
