use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use photobooth::{
    BoothConfig, CancelToken, CaptureFilter, CollageSession, Compositor, DirExporter,
    EncodedRaster, Exporter as _, FileGallery, Gallery as _, Layout, Notice, NoticeLevel,
    capture_filename, capture_still, compute_rects, gallery_item_filename, now_local,
};

#[derive(Parser, Debug)]
#[command(name = "photobooth", version, about = "Photo booth gallery and collage tool")]
struct Cli {
    /// JSON config file (defaults plus PHOTOBOOTH_* env overrides when omitted).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print layout plans as JSON.
    Layouts(LayoutsArgs),
    /// Filter an image file and store it in the gallery.
    Ingest(IngestArgs),
    /// Inspect or edit the gallery.
    #[command(subcommand)]
    Gallery(GalleryCmd),
    /// Compose gallery photos into a collage JPEG.
    Collage(CollageArgs),
    /// Render the empty-state preview for a layout.
    Placeholder(PlaceholderArgs),
}

#[derive(Parser, Debug)]
struct LayoutsArgs {
    /// Number of items to lay out.
    #[arg(long, default_value_t = 4)]
    count: usize,

    /// Only this layout (all layouts when omitted).
    #[arg(long)]
    layout: Option<Layout>,
}

#[derive(Parser, Debug)]
struct IngestArgs {
    /// Image file (JPEG, PNG, WebP, GIF, BMP).
    file: PathBuf,

    /// Capture filter name; unknown names mean `none`.
    #[arg(long, default_value = "none")]
    filter: String,

    /// Also write the filtered still to the export directory.
    #[arg(long)]
    download: bool,
}

#[derive(Subcommand, Debug)]
enum GalleryCmd {
    /// List entries, most recent first.
    List,
    /// Delete one entry.
    Remove {
        /// Entry id.
        id: u64,
    },
    /// Write one entry to the export directory.
    Export {
        /// Entry id.
        id: u64,
    },
}

#[derive(Parser, Debug)]
struct CollageArgs {
    /// Layout id: grid2x2, grid3x3, strip or polaroid.
    #[arg(long, default_value = "grid2x2")]
    layout: Layout,

    /// Gallery ids in placement order, comma separated.
    #[arg(long, value_delimiter = ',', required = true)]
    ids: Vec<u64>,

    /// Output directory (config `export_dir` when omitted).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Also add the collage to the gallery.
    #[arg(long)]
    save: bool,
}

#[derive(Parser, Debug)]
struct PlaceholderArgs {
    /// Layout whose nominal canvas is used.
    #[arg(long, default_value = "grid2x2")]
    layout: Layout,

    /// Output file; `.jpg`/`.jpeg` writes JPEG, anything else PNG.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => BoothConfig::load(path)?,
        None => BoothConfig::from_env()?,
    };

    match cli.cmd {
        Command::Layouts(args) => cmd_layouts(args),
        Command::Ingest(args) => cmd_ingest(&config, args),
        Command::Gallery(cmd) => cmd_gallery(&config, cmd),
        Command::Collage(args) => cmd_collage(&config, args),
        Command::Placeholder(args) => cmd_placeholder(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn open_gallery(config: &BoothConfig) -> anyhow::Result<FileGallery> {
    Ok(FileGallery::open(
        &config.gallery_path,
        config.gallery_capacity,
    )?)
}

fn cmd_layouts(args: LayoutsArgs) -> anyhow::Result<()> {
    let layouts: Vec<Layout> = match args.layout {
        Some(l) => vec![l],
        None => Layout::ALL.to_vec(),
    };
    let plans = layouts
        .into_iter()
        .map(|l| compute_rects(l, args.count))
        .collect::<Result<Vec<_>, _>>()?;
    println!("{}", serde_json::to_string_pretty(&plans)?);
    Ok(())
}

fn cmd_ingest(config: &BoothConfig, args: IngestArgs) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(&args.file).with_context(|| format!("read '{}'", args.file.display()))?;
    let filter = CaptureFilter::parse(&args.filter);
    let mut gallery = open_gallery(config)?;
    let entry = capture_still(
        &EncodedRaster::from_bytes(bytes),
        filter,
        config.jpeg_quality,
        &mut gallery,
    )?;
    println!("captured {} ({filter})", entry.id);

    if args.download {
        let filename = capture_filename(now_local(), filter)?;
        DirExporter::new(&config.export_dir).export(&entry.raster()?, &filename)?;
        println!("{}", config.export_dir.join(&filename).display());
    }
    Ok(())
}

fn cmd_gallery(config: &BoothConfig, cmd: GalleryCmd) -> anyhow::Result<()> {
    let mut gallery = open_gallery(config)?;
    match cmd {
        GalleryCmd::List => {
            for e in gallery.entries() {
                let layout = e.layout.map(|l| l.to_string()).unwrap_or_default();
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    e.id,
                    e.kind(),
                    e.filter,
                    layout,
                    e.timestamp
                );
            }
        }
        GalleryCmd::Remove { id } => {
            gallery.remove(id)?;
            println!("removed {id}");
        }
        GalleryCmd::Export { id } => {
            let entry = gallery
                .get(id)
                .with_context(|| format!("no gallery entry with id {id}"))?;
            let filename = gallery_item_filename(entry)?;
            DirExporter::new(&config.export_dir).export(&entry.raster()?, &filename)?;
            println!("{}", config.export_dir.join(&filename).display());
        }
    }
    Ok(())
}

fn cmd_collage(config: &BoothConfig, args: CollageArgs) -> anyhow::Result<()> {
    let mut gallery = open_gallery(config)?;
    let mut session = CollageSession::new(config);
    let outcome = run_collage(&mut session, &mut gallery, &args, config);
    print_notices(&session.take_notices());
    outcome
}

fn run_collage(
    session: &mut CollageSession,
    gallery: &mut FileGallery,
    args: &CollageArgs,
    config: &BoothConfig,
) -> anyhow::Result<()> {
    session.open(&*gallery)?;
    session.choose_layout(args.layout)?;
    for &id in &args.ids {
        session.toggle(id)?;
    }
    session.render(&CancelToken::new())?;

    let out_dir = args.out.as_deref().unwrap_or(config.export_dir.as_path());
    let filename = session.download(&mut DirExporter::new(out_dir))?;
    println!("{}", out_dir.join(filename).display());

    if args.save {
        let id = session.save_to_gallery(gallery)?;
        println!("saved {id}");
    }
    Ok(())
}

fn print_notices(notices: &[Notice]) {
    for n in notices {
        match n.level {
            NoticeLevel::Success => tracing::info!("{}", n.message),
            NoticeLevel::Error => eprintln!("{}", n.message),
        }
    }
}

fn cmd_placeholder(args: PlaceholderArgs) -> anyhow::Result<()> {
    let surface = Compositor::default().render_placeholder(args.layout.canvas_size())?;
    let encoded = if is_jpeg_path(&args.out) {
        surface.encode_jpeg(90)?
    } else {
        surface.encode_png()?
    };
    std::fs::write(&args.out, encoded.as_bytes())
        .with_context(|| format!("write '{}'", args.out.display()))?;
    println!("{}", args.out.display());
    Ok(())
}

fn is_jpeg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"))
}
