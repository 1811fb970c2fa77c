//! Host tool for tag layouts.
//!
//! ```bash
//! # Preview the demo layout as PBM planes
//! tagdraw render --text "Aisle 7" --layout black-red -o frame
//!
//! # Convert a PBM into a stored image, then pack a flash image
//! tagdraw convert logo.pbm logo.z --compress
//! tagdraw pack -o flash.bin logo.z
//! tagdraw render --flash flash.bin --logo logo.z
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use miniz_oxide::deflate::compress_to_vec_zlib;
use tagdraw_core::{
    BitDepth, CaptureSink, DrawList, ImageHeader, PanelConfig, Plane, PlaneLayout, Rotation,
};
use tagdraw_storage::{RamFlash, TagStorage, pack_files};

use scene::Scene;

#[path = "main/pbm.rs"]
mod pbm;
#[path = "main/scene.rs"]
mod scene;

const COMPRESSION_LEVEL: u8 = 9;

#[derive(Parser)]
#[command(name = "tagdraw")]
#[command(version)]
#[command(about = "Compose e-paper tag frames line by line")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the demo layout into one PBM per panel plane
    Render(RenderArgs),

    /// Convert PBM planes into a header-prefixed tag image
    Convert {
        /// Black plane
        input: PathBuf,
        /// Output image file
        out: PathBuf,
        /// Red plane; makes a two-plane image
        #[arg(long)]
        red: Option<PathBuf>,
        /// Zlib-compress the image
        #[arg(long)]
        compress: bool,
        /// Prefix the compressed stream with its length, for placement at
        /// a raw flash address instead of in the file table
        #[arg(long, requires = "compress")]
        length_prefix: bool,
    },

    /// Pack files into a flash file table image
    Pack {
        /// Output flash image
        #[arg(short, long)]
        out: PathBuf,
        /// Files to store, named by their file name
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(clap::Args)]
struct RenderArgs {
    #[arg(long, default_value_t = 128)]
    width: u16,
    #[arg(long, default_value_t = 296)]
    height: u16,
    #[arg(long, value_enum, default_value_t = Layout::BlackRed)]
    layout: Layout,
    #[arg(long, default_value = "tagdraw")]
    text: String,
    #[arg(long, value_enum, default_value_t = Turn::Deg0)]
    rotation: Turn,
    /// Glyph scale factor
    #[arg(long, default_value_t = 2)]
    size: u8,
    /// Flash image holding a file table
    #[arg(long)]
    flash: Option<PathBuf>,
    /// Address of the file table inside the flash image
    #[arg(long, default_value_t = 0)]
    table_base: u32,
    /// Font descriptor name in the file table
    #[arg(long, requires = "flash")]
    font: Option<String>,
    /// Image name in the file table
    #[arg(long, requires = "flash")]
    logo: Option<String>,
    /// Output prefix; planes land in `<out>-black.pbm` and `<out>-red.pbm`
    #[arg(short, long, default_value = "frame")]
    out: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum Layout {
    Mono,
    BlackRed,
}

impl From<Layout> for PlaneLayout {
    fn from(layout: Layout) -> Self {
        match layout {
            Layout::Mono => PlaneLayout::Mono,
            Layout::BlackRed => PlaneLayout::BlackRed,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Turn {
    #[value(name = "0")]
    Deg0,
    #[value(name = "90")]
    Deg90,
    #[value(name = "180")]
    Deg180,
    #[value(name = "270")]
    Deg270,
}

impl From<Turn> for Rotation {
    fn from(turn: Turn) -> Self {
        match turn {
            Turn::Deg0 => Rotation::Rotate0,
            Turn::Deg90 => Rotation::Rotate90,
            Turn::Deg180 => Rotation::Rotate180,
            Turn::Deg270 => Rotation::Rotate270,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Commands::Render(args) => render(args),
        Commands::Convert {
            input,
            out,
            red,
            compress,
            length_prefix,
        } => convert(&input, red.as_deref(), &out, compress, length_prefix),
        Commands::Pack { out, files } => pack(&out, &files),
    }
}

fn render(args: RenderArgs) -> Result<()> {
    let config = PanelConfig::new(args.width, args.height, args.layout.into());
    config
        .validate()
        .map_err(|err| anyhow!("invalid panel: {err:?}"))?;

    let image = match &args.flash {
        Some(path) => fs::read(path).with_context(|| format!("reading {}", path.display()))?,
        None => Vec::new(),
    };
    let mut storage = TagStorage::new(RamFlash(image));
    if args.flash.is_some() {
        let files = storage
            .mount(args.table_base)
            .map_err(|err| anyhow!("mounting file table: {err:?}"))?;
        info!("render: mounted files={}", files);
    }

    let mut list: DrawList<'_> = DrawList::new(config);
    let scene = Scene {
        text: &args.text,
        rotation: args.rotation.into(),
        size: args.size,
        font: args.font.as_deref(),
        logo: args.logo.as_deref(),
    };
    scene::compose(&mut list, &mut storage, &scene)?;
    info!("render: queued items={}", list.len());

    let mut sink = CaptureSink::new(config, 0);
    let stats = list
        .flush(&mut sink, &mut storage)
        .map_err(|err| anyhow!("flush: {err:?}"))?;
    info!(
        "render: lines={} contributions={} faults={}",
        stats.lines, stats.contributions, stats.faults
    );

    for &plane in config.planes() {
        let suffix = match plane {
            Plane::Black => "black",
            Plane::Red => "red",
        };
        let path = plane_path(&args.out, suffix);
        pbm::write(&path, config.width, config.height, sink.plane(plane))?;
        info!("render: wrote {}", path.display());
    }
    Ok(())
}

fn plane_path(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!("-{suffix}.pbm"));
    PathBuf::from(name)
}

fn convert(black: &Path, red: Option<&Path>, out: &Path, compress: bool, length_prefix: bool) -> Result<()> {
    let black = pbm::read(black)?;
    let mut depth = BitDepth::One;
    let mut body = black.rows.clone();
    if let Some(path) = red {
        let red = pbm::read(path)?;
        if (red.width, red.height) != (black.width, black.height) {
            bail!(
                "plane sizes differ: black {}x{}, red {}x{}",
                black.width,
                black.height,
                red.width,
                red.height
            );
        }
        depth = BitDepth::Two;
        body.extend_from_slice(&red.rows);
    }

    let header = ImageHeader {
        width: black.width,
        height: black.height,
        depth,
    };
    let mut image = header.encode().to_vec();
    image.extend_from_slice(&body);

    if compress {
        let stream = compress_to_vec_zlib(&image, COMPRESSION_LEVEL);
        image = if length_prefix {
            let len = u32::try_from(stream.len()).context("compressed image too large")?;
            let mut prefixed = len.to_le_bytes().to_vec();
            prefixed.extend_from_slice(&stream);
            prefixed
        } else {
            stream
        };
    }

    fs::write(out, &image).with_context(|| format!("writing {}", out.display()))?;
    info!(
        "convert: {}x{} planes={} bytes={}",
        header.width,
        header.height,
        if depth == BitDepth::Two { 2 } else { 1 },
        image.len()
    );
    Ok(())
}

fn pack(out: &Path, files: &[PathBuf]) -> Result<()> {
    let mut contents = Vec::with_capacity(files.len());
    for path in files {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("no usable file name in {}", path.display()))?
            .to_owned();
        let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        contents.push((name, data));
    }

    let entries: Vec<(&str, &[u8])> = contents
        .iter()
        .map(|(name, data)| (name.as_str(), data.as_slice()))
        .collect();
    let image = pack_files(&entries).map_err(|err| anyhow!("packing: {err:?}"))?;
    fs::write(out, &image).with_context(|| format!("writing {}", out.display()))?;
    info!("pack: files={} bytes={}", entries.len(), image.len());
    Ok(())
}
