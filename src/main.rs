use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};

use sigpad::codec::{self, data_url};
use sigpad::compose::{Compositor, ImageCompositor};
use sigpad::{
    ContainerSurface, DrawingRecord, EncoderOptions, ImageLayer, ImageType, PadConfig,
    ResizeEvents, SignatureOptions, SignaturePad,
};

#[derive(Parser, Debug)]
#[command(name = "sigpad", version, about = "Render and compose signature drawings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON stroke record and export it as an image
    Render {
        /// Stroke record as produced by the pad's `to_data`
        record: PathBuf,
        /// Signature options JSON; defaults to the user config file
        #[arg(long)]
        options: Option<PathBuf>,
        #[arg(long, default_value_t = 300.0)]
        width: f32,
        #[arg(long, default_value_t = 150.0)]
        height: f32,
        /// Device pixel ratio of the backing store
        #[arg(long)]
        ratio: Option<f64>,
        /// png, jpeg or svg (MIME types are accepted too)
        #[arg(long, short)]
        format: Option<String>,
        /// JPEG quality in 0..=1
        #[arg(long)]
        quality: Option<f32>,
        #[arg(long, short)]
        output: PathBuf,
    },
    /// Flatten image layers into one PNG, bottom layer first
    Merge {
        /// Layer sources as `path[@x,y]`
        #[arg(required = true)]
        layers: Vec<String>,
        #[arg(long, short)]
        output: PathBuf,
    },
}

/// Parse `src[@x,y]` into a positioned layer
fn parse_layer(arg: &str) -> anyhow::Result<ImageLayer> {
    let Some((src, offset)) = arg.rsplit_once('@') else {
        return Ok(ImageLayer::new(arg));
    };
    let Some((x, y)) = offset.split_once(',') else {
        // an '@' inside the source itself
        return Ok(ImageLayer::new(arg));
    };
    let x = x.trim().parse::<i64>().with_context(|| format!("invalid x offset in {arg:?}"))?;
    let y = y.trim().parse::<i64>().with_context(|| format!("invalid y offset in {arg:?}"))?;
    Ok(ImageLayer::at(src, x, y))
}

fn load_options(path: Option<PathBuf>) -> anyhow::Result<SignatureOptions> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("reading options {}", path.display()))?;
            Ok(SignatureOptions::from_json_str(&json)?)
        }
        None => Ok(SignatureOptions::default_path()
            .map(|path| SignatureOptions::load(&path))
            .unwrap_or_default()),
    }
}

#[allow(clippy::too_many_arguments)]
fn render(
    record: PathBuf,
    options: Option<PathBuf>,
    width: f32,
    height: f32,
    ratio: Option<f64>,
    format: Option<String>,
    quality: Option<f32>,
    output: PathBuf,
) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&record)
        .with_context(|| format!("reading record {}", record.display()))?;
    let record: DrawingRecord = serde_json::from_str(&json).context("parsing stroke record")?;

    let config = PadConfig {
        options: load_options(options)?,
        ..Default::default()
    };
    let mut pad = SignaturePad::new(config);
    let events = ResizeEvents::new();
    pad.mount(Rc::new(ContainerSurface::fixed(width, height, ratio)), &events)?;
    pad.from_data(&record)?;

    let encoder = quality.map(EncoderOptions::with_quality).unwrap_or_default();
    let status = pad.save(format.as_deref(), &encoder)?;
    let Some(url) = status.data else {
        bail!("nothing to render: the record contains no strokes");
    };
    let bytes = data_url::decode(&url)?.data;
    std::fs::write(&output, bytes).with_context(|| format!("writing {}", output.display()))?;
    log::info!("Rendered {} strokes to {}", record.len(), output.display());
    Ok(())
}

async fn merge(layers: Vec<String>, output: PathBuf) -> anyhow::Result<()> {
    let layers = layers
        .iter()
        .map(|arg| parse_layer(arg))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let count = layers.len();
    let image = ImageCompositor.compose(layers).await?;
    let bytes = codec::encode_raster(&image, ImageType::Png, &EncoderOptions::default())?;
    std::fs::write(&output, bytes).with_context(|| format!("writing {}", output.display()))?;
    log::info!("Merged {count} layers into {}", output.display());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match Cli::parse().command {
        Command::Render {
            record,
            options,
            width,
            height,
            ratio,
            format,
            quality,
            output,
        } => render(record, options, width, height, ratio, format, quality, output),
        Command::Merge { layers, output } => merge(layers, output).await,
    }
}
