//! # vizdoc CLI
//!
//! Command-line interface for rendering and exporting documents.
//!
//! ## Usage
//!
//! ```bash
//! # List document kinds and their template variants
//! vizdoc list
//!
//! # Export a report as PDF into ./out
//! vizdoc render report classic --payload data.json --out out
//!
//! # Export one presentation slide as JPEG
//! vizdoc render presentation bold --format jpeg --pages 2
//!
//! # Low-density thumbnail of the first page
//! vizdoc thumbnail graphic sale --output thumb.png
//!
//! # Preview scaled into a 800x600 container
//! vizdoc preview contract elegant --container 800x600 --output preview.png
//! ```
//!
//! Set `RUST_LOG=debug` for per-capture logging.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use vizdoc::{
    VizdocConfig, VizdocError,
    document::{DocumentKind, Payload, RenderedDocument, registry, render, resolve::ImageResolver},
    export::{ExportFormat, ExportJob, ExportPipeline},
    preview::{ContainerSize, PreviewController, ScaleMode},
    stage::{NodeHandle, Stage},
    thumbnail::ThumbnailService,
};

/// vizdoc - visual document rendering and export
#[derive(Parser, Debug)]
#[command(name = "vizdoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (JSON); falls back to $VIZDOC_CONFIG
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct Source {
    /// Document kind: report, contract, presentation or graphic
    kind: DocumentKind,

    /// Template variant id (unknown ids render a placeholder)
    variant: String,

    /// JSON object with the template fields
    #[arg(long, value_name = "FILE")]
    payload: Option<PathBuf>,

    /// Skip fetching images; they draw as placeholder tiles
    #[arg(long)]
    offline: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List document kinds and template variants
    List,

    /// Render and export a document
    Render {
        #[command(flatten)]
        source: Source,

        /// Output format: pdf, png or jpeg
        #[arg(long, default_value = "pdf")]
        format: ExportFormat,

        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Device pixels per native pixel (overrides config)
        #[arg(long)]
        density: Option<f32>,

        /// Comma-separated page indices, in output order
        #[arg(long, value_delimiter = ',')]
        pages: Vec<usize>,

        /// Month used for the file name when the payload has no period
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },

    /// Capture a low-density thumbnail of the first page
    Thumbnail {
        #[command(flatten)]
        source: Source,

        /// Output PNG file
        #[arg(long, default_value = "thumbnail.png")]
        output: PathBuf,
    },

    /// Rasterize a page at preview scale
    Preview {
        #[command(flatten)]
        source: Source,

        /// Container size, e.g. 1280x720
        #[arg(long)]
        container: ContainerSize,

        /// Page index
        #[arg(long, default_value = "0")]
        page: usize,

        /// Full-screen presentation mode (fit both axes)
        #[arg(long)]
        presentation: bool,

        /// Output PNG file
        #[arg(long, default_value = "preview.png")]
        output: PathBuf,
    },
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {}", e))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), VizdocError> {
    let cli = Cli::parse();
    let config = VizdocConfig::discover(cli.config.as_deref())?;

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    runtime.block_on(execute(cli.command, config))
}

async fn execute(command: Commands, config: VizdocConfig) -> Result<(), VizdocError> {
    match command {
        Commands::List => {
            list_templates();
            Ok(())
        }

        Commands::Render {
            source,
            format,
            out,
            density,
            pages,
            date,
        } => {
            let node = mount(&source).await?;
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let mut job = ExportJob::new(node, format, &config.export, date);
            if let Some(density) = density {
                job = job.with_density(density);
            }
            if !pages.is_empty() {
                job = job.with_pages(pages);
            }

            let pipeline = ExportPipeline::new(&config.export);
            let saved = match pipeline.run(&job).await {
                Ok(artifact) => artifact.save(&out),
                Err(e) => Err(e),
            };
            match saved {
                Ok(path) => {
                    println!("Saved {}", path.display());
                    Ok(())
                }
                Err(e) => {
                    eprintln!("export failed, nothing was saved");
                    Err(e)
                }
            }
        }

        Commands::Thumbnail { source, output } => {
            let node = mount(&source).await?;
            let service = ThumbnailService::new(config.thumbnails.clone());
            match service.generate(&service.request(node)).await {
                Some(shot) => {
                    std::fs::write(&output, &shot.bytes)?;
                    println!("Saved {} ({}x{})", output.display(), shot.width, shot.height);
                }
                None => println!("No thumbnail produced"),
            }
            Ok(())
        }

        Commands::Preview {
            source,
            container,
            page,
            presentation,
            output,
        } => {
            let node = mount(&source).await?;
            let mode = ScaleMode::from_settings(&config.preview, presentation);
            let mut preview = PreviewController::new(node, mode);
            let transform = preview.mount(container);
            println!("{}", transform.css());
            match preview.render_preview(page)? {
                Some(image) => {
                    image
                        .save(&output)
                        .map_err(|e| VizdocError::Image(format!("Failed to save {}: {}", output.display(), e)))?;
                    println!("Saved {}", output.display());
                    Ok(())
                }
                None => Err(VizdocError::InvalidJob(format!("page {} does not exist", page))),
            }
        }
    }
}

fn list_templates() {
    for kind in DocumentKind::ALL {
        println!("{}:", kind);
        for def in registry::variants(kind) {
            println!(
                "  {:<14} {:<18} {}x{}",
                def.id, def.name, def.size.width, def.size.height
            );
        }
    }
}

fn load_payload(path: Option<&Path>) -> Result<Payload, VizdocError> {
    match path {
        Some(path) => Ok(Payload::from_json(&std::fs::read_to_string(path)?)?),
        None => Ok(Payload::new()),
    }
}

fn report_document(doc: &RenderedDocument) {
    if doc.fallback {
        log::warn!("unknown {} variant, rendered the placeholder", doc.kind);
    }
    for note in &doc.notes {
        println!("Note: {}", note);
    }
}

/// Render the source and mount it, waiting for its images.
async fn mount(source: &Source) -> Result<NodeHandle, VizdocError> {
    let payload = load_payload(source.payload.as_deref())?;
    let doc = render(source.kind, &source.variant, &payload);
    report_document(&doc);

    let stage = if source.offline {
        Stage::new()
    } else {
        Stage::with_resolver(ImageResolver::with_defaults()?)
    };
    let node = stage.mount(doc);
    node.wait_ready().await;
    Ok(node)
}
