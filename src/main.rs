use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use log::{info, warn};
use structured_logger::json::new_writer;
use structured_logger::Builder;
use xz::bufread::XzDecoder;

use osm_field_filler::codec::{self, stamp};
use osm_field_filler::collaborators::issue_tracker;
use osm_field_filler::collaborators::{DataUrlImageHost, ImageFile, ImageHost, Submitter};
use osm_field_filler::config::AppConfig;
use osm_field_filler::errors::{Error, Result};
use osm_field_filler::{FormController, UpdateOutcome};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// key=value lines ending with the integrity stamp
    Text,
    Xml,
}

/// Fill in the tags of a single OpenStreetMap node and export it.
#[derive(Parser, Debug)]
#[command(name = "osm-field-filler")]
struct Args {
    /// JSON settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start from an OSM-XML (.xml, .osm) or line-format file, optionally .xz compressed
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Set a tag, e.g. --set name="Padaria Central"
    #[arg(long = "set", value_name = "KEY=VALUE")]
    tags: Vec<String>,

    /// Pick a shop type; clears any amenity
    #[arg(long, conflicts_with = "amenity")]
    shop: Option<String>,

    /// Pick an amenity type; clears any shop
    #[arg(long)]
    amenity: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    lat: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    lon: Option<String>,

    /// Embed an image file in the `image` tag
    #[arg(long)]
    image: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Write here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Check the integrity stamp of an exported text file and exit
    #[arg(long, conflicts_with = "input")]
    verify: Option<PathBuf>,

    /// Print the issue title and body for manual submission instead of the record
    #[arg(long)]
    issue: bool,

    /// Extra text for the issue body
    #[arg(long, default_value = "")]
    description: String,
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stderr()))
        .init();
}

fn read_input(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    let mut text = String::new();
    if path.extension().is_some_and(|ext| ext == "xz") {
        XzDecoder::new(BufReader::new(file)).read_to_string(&mut text)?;
    } else {
        BufReader::new(file).read_to_string(&mut text)?;
    }
    Ok(text)
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = File::create(path)?;
            writeln!(file, "{}", text)?;
            info!(path = path.display().to_string().as_str(); "Wrote output");
        },
        None => println!("{}", text),
    }
    Ok(())
}

fn verify(path: &Path) -> Result<()> {
    if stamp::verify(&read_input(path)?)? {
        println!("integrity stamp matches");
        Ok(())
    } else {
        Err(Error::validation("integrity stamp does not match the text"))
    }
}

fn embed_image(controller: &mut FormController, path: &Path) -> Result<()> {
    let file = ImageFile::from_path(path)?;
    let pending = controller.begin_image_upload();
    let upload = DataUrlImageHost.upload(&file);
    match controller.complete_image_upload(pending, upload) {
        UpdateOutcome::Applied => Ok(()),
        UpdateOutcome::Failed => Err(controller
            .last_error()
            .cloned()
            .unwrap_or_else(|| Error::upstream("image upload failed"))),
        other => {
            warn!(outcome = format!("{:?}", other).as_str(); "Image was not applied");
            Ok(())
        },
    }
}

fn run(args: Args, config: AppConfig) -> Result<()> {
    if let Some(path) = &args.verify {
        return verify(path);
    }

    let mut controller = FormController::from_config(&config);

    if let Some(path) = &args.input {
        let text = read_input(path)?;
        let format = codec::for_path(path, &config.generator);
        controller.import(format.as_ref(), &text)?;
    }

    if args.lat.is_some() || args.lon.is_some() {
        let current = controller.record().coordinate.clone();
        controller.edit_coordinate(
            args.lat.as_deref().unwrap_or(&current.lat),
            args.lon.as_deref().unwrap_or(&current.lon),
        )?;
    }

    if let Some(shop) = &args.shop {
        controller.set_shop(shop)?;
    }
    if let Some(amenity) = &args.amenity {
        controller.set_amenity(amenity)?;
    }

    for pair in &args.tags {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::validation(format!("--set expects KEY=VALUE, got {:?}", pair)))?;
        controller.edit_tag(key, value)?;
    }

    if let Some(path) = &args.image {
        embed_image(&mut controller, path)?;
    }

    let text = if args.issue {
        let draft = controller.draft_issue(&args.description, Submitter::default())?;
        match issue_tracker::submit(None, &config.repository(), draft) {
            issue_tracker::SubmissionResult::Manual { fallback, .. } => {
                serde_json::to_string_pretty(&fallback)?
            },
            issue_tracker::SubmissionResult::Created(issue) => issue.issue_url,
        }
    } else {
        match args.format {
            OutputFormat::Text => controller.export_text(),
            OutputFormat::Xml => controller.preview_xml(),
        }
    };

    write_output(args.output.as_deref(), &text)
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    setup_logging(&config.log_level);
    info!(record_format = format!("{:?}", args.format).as_str(); "Starting");

    run(args, config)
}
