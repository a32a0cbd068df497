use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "photostamp", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a stamp list onto a photo and write the JPEG.
    Compose(ComposeArgs),
    /// Composite and publish to a local object/document store.
    Post(PostArgs),
}

#[derive(Parser, Debug)]
struct InputArgs {
    /// Base photo (PNG, JPEG, WebP, ...).
    #[arg(long)]
    photo: PathBuf,

    /// Directory holding the stamp images.
    #[arg(long)]
    catalog: PathBuf,

    /// JSON array of `{asset, x, y, scale?, rotation?}`.
    #[arg(long)]
    stamps: Option<PathBuf>,

    /// Editor config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PostArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Store root; images go to `<store>/objects`, documents to `<store>/posts.jsonl`.
    #[arg(long)]
    store: PathBuf,

    /// Location identifier.
    #[arg(long)]
    location: String,

    /// Location display name.
    #[arg(long)]
    location_name: Option<String>,

    /// Caption text.
    #[arg(long)]
    caption: Option<String>,

    /// Posting account id.
    #[arg(long)]
    uid: String,
}

/// One saved stamp, in normalized photo space.
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct StampSpec {
    asset: photostamp::AssetRef,
    x: f64,
    y: f64,
    #[serde(default = "unit_scale")]
    scale: f64,
    #[serde(default)]
    rotation: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl StampSpec {
    fn patch(&self) -> photostamp::StampPatch {
        photostamp::StampPatch {
            scale: Some(self.scale),
            rotation: Some(self.rotation),
            ..photostamp::StampPatch::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Compose(args) => cmd_compose(args),
        Command::Post(args) => cmd_post(args),
    }
}

struct Inputs {
    config: photostamp::EditorConfig,
    catalog: photostamp::StampCatalog,
    photo: Vec<u8>,
    stamps: Vec<StampSpec>,
}

fn load_inputs(args: &InputArgs) -> anyhow::Result<Inputs> {
    let config = match &args.config {
        Some(p) => photostamp::EditorConfig::from_path(p)?,
        None => photostamp::EditorConfig::default(),
    };
    let catalog = photostamp::StampCatalog::from_dir(&args.catalog)?;
    let photo = std::fs::read(&args.photo)
        .with_context(|| format!("read photo '{}'", args.photo.display()))?;
    let stamps = match &args.stamps {
        Some(p) => read_stamps_json(p)?,
        None => Vec::new(),
    };
    Ok(Inputs {
        config,
        catalog,
        photo,
        stamps,
    })
}

fn read_stamps_json(path: &Path) -> anyhow::Result<Vec<StampSpec>> {
    let f = File::open(path).with_context(|| format!("open stamps '{}'", path.display()))?;
    let stamps: Vec<StampSpec> =
        serde_json::from_reader(BufReader::new(f)).with_context(|| "parse stamps JSON")?;
    Ok(stamps)
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let inputs = load_inputs(&args.input)?;

    // Replay through the store so every clamp applies.
    let mut store = photostamp::OverlayStore::new(inputs.config.scale_bounds()?);
    for spec in &inputs.stamps {
        if !inputs.catalog.contains(&spec.asset) {
            anyhow::bail!("stamp '{}' is not in the catalog", spec.asset);
        }
        let id = store.place(spec.asset.clone(), spec.x, spec.y);
        store.update(id, spec.patch());
    }

    let compositor =
        photostamp::Compositor::new(photostamp::ComposeSettings::from(&inputs.config));
    let photo = photostamp::BasePhoto::new(inputs.photo);
    let composed = compositor.compose(&photo, store.stamps(), &inputs.catalog)?;
    for s in &composed.skipped {
        eprintln!("skipped stamp '{}': {}", s.asset, s.reason);
    }

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &composed.encoded)
        .with_context(|| format!("write jpeg '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({}x{})",
        args.out.display(),
        composed.frame.width,
        composed.frame.height
    );
    Ok(())
}

fn cmd_post(args: PostArgs) -> anyhow::Result<()> {
    let inputs = load_inputs(&args.input)?;
    let mut session = photostamp::EditingSession::new(
        inputs.photo,
        Arc::new(inputs.catalog),
        inputs.config,
    )?;
    for spec in &inputs.stamps {
        let id = session.place_stamp(
            spec.asset.clone(),
            photostamp::NormPoint::clamped(spec.x, spec.y),
        )?;
        session.update_stamp(id, spec.patch());
    }

    let mut draft = photostamp::PostDraft::new(args.location);
    draft.caption = args.caption;
    draft.location_name = args.location_name;

    let mut objects = photostamp::FsObjectStore::new(args.store.join("objects"));
    let mut docs = photostamp::JsonlDocumentStore::new(args.store.join("posts.jsonl"));
    let receipt = session.submit_with_fallback(
        &draft,
        &photostamp::Owner::new(args.uid),
        &mut objects,
        &mut docs,
    )?;
    session.end();

    if let Some(warning) = &receipt.fallback_warning {
        eprintln!("warning: posted the raw photo: {warning}");
    }
    println!("{}", serde_json::to_string_pretty(&receipt.document)?);
    eprintln!("posted {} as {}", receipt.object_key, receipt.document_id);
    Ok(())
}
