use clap::Parser;
use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Cursor, Read, Seek, Write};
use std::process::ExitCode;
use tapewave_core::{
    ByteSource, EncoderConfig, FormatPreset, ImageMode, ImageSource, MemoryImage, Quantization,
    RawSource, TapeEncoder,
};

/// Path argument meaning stdin (input) or stdout (output)
const STDIO: &str = "-";

#[derive(Parser)]
#[command(name = "tapewave")]
#[command(version)]
#[command(about = "Encode binary data or Intel HEX images as cassette tape audio (WAV)")]
struct Cli {
    /// Baud rate
    #[arg(short = 'b', value_name = "BAUD", default_value_t = tapewave_core::DEFAULT_BAUD_RATE)]
    baud_rate: u32,

    /// Number of channels (1 or 2)
    #[arg(short = 'c', value_name = "CHANNELS", default_value_t = 1)]
    channels: u16,

    /// Tape layout: a preset name (default, io, bin) or a format string
    /// such as "b2.0 h3.5 d"
    #[arg(short = 'f', value_name = "FORMAT", default_value = "default")]
    format: String,

    /// Bits per sample (8 or 16)
    #[arg(short = 'q', value_name = "BITS", default_value_t = 8)]
    bits: u16,

    /// Sample rate in Hz
    #[arg(short = 'r', value_name = "RATE", default_value_t = tapewave_core::DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Number of stop bits
    #[arg(short = 's', value_name = "STOP_BITS", default_value_t = tapewave_core::DEFAULT_STOP_BITS)]
    stop_bits: u32,

    /// Low (space) carrier frequency in Hz; the mark tone is twice this
    #[arg(short = 'w', value_name = "HZ", default_value_t = tapewave_core::DEFAULT_LOW_CARRIER)]
    low_carrier: u32,

    /// Read INPUT as Intel HEX and write it as tape blocks
    #[arg(short = 'i')]
    intel_hex: bool,

    /// With -i, write the decoded image bytes without block framing
    #[arg(long, requires = "intel_hex")]
    raw_image: bool,

    /// Input file ("-" for stdin)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output WAV file ("-" for stdout)
    #[arg(value_name = "OUTPUT")]
    output: String,
}

impl Cli {
    fn encoder_config(&self) -> Result<EncoderConfig, Box<dyn Error>> {
        Ok(EncoderConfig {
            sample_rate: self.sample_rate,
            quantization: Quantization::try_from(self.bits)?,
            channels: self.channels,
            baud_rate: self.baud_rate,
            low_carrier: self.low_carrier,
            stop_bits: self.stop_bits,
            format: FormatPreset::resolve(&self.format),
        })
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and are not failures
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    let mut encoder = TapeEncoder::new(cli.encoder_config()?)?;
    log::debug!("Tape layout: {:?}", encoder.segments());

    let input = open_input(&cli.input)?;

    if cli.intel_hex {
        // Decode the whole image before any output exists
        let image = MemoryImage::read_intel_hex(input)?;
        eprintln!("Start: {:04x} Size: {}", image.origin(), image.len());
        let mode = if cli.raw_image {
            ImageMode::Raw
        } else {
            ImageMode::TapeBlocks
        };
        write_output(&mut encoder, ImageSource::new(&image, mode), &cli.output)
    } else {
        write_output(&mut encoder, RawSource::new(input), &cli.output)
    }
}

fn open_input(path: &str) -> Result<Box<dyn Read>, Box<dyn Error>> {
    if path == STDIO {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).map_err(|e| format!("cannot open input {}: {}", path, e))?;
    Ok(Box::new(file))
}

fn write_output<S: ByteSource>(
    encoder: &mut TapeEncoder,
    source: S,
    path: &str,
) -> Result<(), Box<dyn Error>> {
    if path == STDIO {
        // stdout cannot seek back to the header, so assemble in memory
        let mut buffer = Cursor::new(Vec::new());
        encode_into(encoder, source, &mut buffer)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(buffer.get_ref())?;
        stdout.flush()?;
        return Ok(());
    }

    let file = File::create(path).map_err(|e| format!("cannot create output {}: {}", path, e))?;
    let mut writer = BufWriter::new(file);
    encode_into(encoder, source, &mut writer)?;
    writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    Ok(())
}

fn encode_into<S: ByteSource, W: Write + Seek>(
    encoder: &mut TapeEncoder,
    source: S,
    sink: &mut W,
) -> Result<(), Box<dyn Error>> {
    let total = encoder.encode_wav(source, sink)?;
    let config = encoder.config();
    log::info!(
        "Wrote {} bytes of audio ({:.2}s at {} Hz, {} bit, {} channel(s))",
        total,
        total as f64 / (config.block_align() as f64 * config.sample_rate as f64),
        config.sample_rate,
        config.quantization.bits(),
        config.channels
    );
    Ok(())
}
