use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use segcrop::{ClassNames, Pipeline, PipelineConfig};
use segcrop_cli::RunReport;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the detector on an image and cut one crop per detected instance
    Run {
        /// Path to the source image
        #[arg(short, long)]
        image: PathBuf,
        /// Pipeline configuration (.toml or .json)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write a JSON manifest of the produced crops
        #[arg(short, long)]
        manifest: Option<PathBuf>,
        /// Override the crop padding in pixels
        #[arg(long)]
        pad: Option<u32>,
        /// Override the crops directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Override the class-name file
        #[arg(long)]
        class_names: Option<PathBuf>,
    },
    /// Cut crops from an existing annotation file without running the detector
    Crop {
        /// Path to the source image
        #[arg(short, long)]
        image: PathBuf,
        /// Annotation file (`class x1 y1 ... xn yn conf` per line)
        #[arg(short, long)]
        labels: PathBuf,
        /// Optional class-name file, one name per line
        #[arg(long)]
        class_names: Option<PathBuf>,
        /// Directory the crops are written to
        #[arg(short, long)]
        output_dir: PathBuf,
        /// Padding around each instance in pixels
        #[arg(long, default_value_t = segcrop::DEFAULT_PAD)]
        pad: u32,
        /// Write a JSON manifest of the produced crops
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
    /// Print the JSON schema of the pipeline configuration
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            image,
            config,
            manifest,
            pad,
            output_dir,
            class_names,
        } => {
            let mut config = match config {
                Some(path) => PipelineConfig::from_file(&path)
                    .wrap_err_with(|| format!("loading config {}", path.display()))?,
                None => PipelineConfig::default(),
            };
            if let Some(pad) = pad {
                config.pad = pad;
            }
            if output_dir.is_some() {
                config.output_dir = output_dir;
            }
            if class_names.is_some() {
                config.class_names_path = class_names;
            }
            run_pipeline(&image, config, manifest.as_deref())?;
        }
        Commands::Crop {
            image,
            labels,
            class_names,
            output_dir,
            pad,
            manifest,
        } => {
            crop_labels(
                &image,
                &labels,
                class_names.as_deref(),
                &output_dir,
                pad,
                manifest.as_deref(),
            )?;
        }
        Commands::Schema => {
            let schema = PipelineConfig::schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn run_pipeline(image: &Path, config: PipelineConfig, manifest: Option<&Path>) -> Result<()> {
    info!("Segmenting {}", image.display());
    let pipeline = Pipeline::builder().config(config).build();
    let output = pipeline.run(image)?;

    info!("Annotated image: {}", output.annotated_image.display());
    let report = RunReport::from_output(image, output);
    finish(&report, manifest)
}

fn crop_labels(
    image: &Path,
    labels: &Path,
    class_names: Option<&Path>,
    output_dir: &Path,
    pad: u32,
    manifest: Option<&Path>,
) -> Result<()> {
    let names = match class_names {
        Some(path) => ClassNames::load(path)?,
        None => None,
    };
    let cropper = Pipeline::builder().pad(pad).build_cropper();
    let artifacts = cropper.crop_labels(image, labels, names.as_ref(), output_dir)?;

    let report = RunReport::new(image, None, artifacts, names.as_ref());
    finish(&report, manifest)
}

fn finish(report: &RunReport, manifest: Option<&Path>) -> Result<()> {
    print!("{}", report.listing());
    if let Some(path) = manifest {
        report
            .to_json_file(path)
            .wrap_err_with(|| format!("writing manifest {}", path.display()))?;
        info!("Manifest saved to {}", path.display());
    }
    info!("{} crops written", report.crops.len());
    Ok(())
}
