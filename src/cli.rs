use crate::config::PipelineConfig;
use crate::formats::{OutputFormat, ResampleFilter};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "supplier-ingest",
    about = "Convert supplier images and upload them, with product descriptions, to a catalog service",
    long_about = "supplier-ingest runs the supplier-data onboarding workflow: it converts raw images \
                  to fixed-size JPEGs next to the originals, uploads the converted images one by one, \
                  and uploads product descriptions parsed from text files as a single JSON batch. \
                  A failure on one file is logged and counted; the run carries on with the next.",
    version,
    after_help = "EXAMPLES:\n  \
    supplier-ingest convert --dir ~/supplier-data/images -w 600 -H 400\n  \
    supplier-ingest upload-images --endpoint http://catalog.local/upload/\n  \
    supplier-ingest upload-descriptions --dry-run\n  \
    supplier-ingest --config ingest.toml run"
)]
pub struct Args {
    #[arg(
        short = 'c',
        long,
        global = true,
        help = "TOML configuration file",
        long_help = "TOML configuration file. Keys that are not set keep their defaults; \
                     command-line flags override the file."
    )]
    pub config: Option<PathBuf>,

    #[arg(short = 'v', long, global = true, help = "Show debug output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Only show warnings and errors")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Resize and re-encode source images",
        long_about = "Find every source image under the images directory, resize it to the target \
                      dimensions, drop any alpha channel and write <name>.jpeg (or the configured \
                      format) next to it. Originals are never modified."
    )]
    Convert {
        #[command(flatten)]
        images: ImageArgs,
    },

    #[command(
        about = "Upload converted images one request per file",
        long_about = "Upload every converted image under the images directory as a multipart form \
                      field named `file`. A status of 200 or 201 counts as success; anything else \
                      is counted as a failure and the next file is tried."
    )]
    UploadImages {
        #[arg(short = 'd', long, help = "Images directory")]
        dir: Option<PathBuf>,

        #[arg(short = 'e', long, help = "Image upload endpoint URL")]
        endpoint: Option<String>,

        #[arg(long, help = "Per-request timeout in seconds")]
        timeout: Option<u64>,
    },

    #[command(
        about = "Parse description files and upload them as one JSON batch",
        long_about = "Parse every description file (name, weight, description) into a product \
                      record and POST all records as one JSON array. Invalid files are skipped. \
                      If the single request fails the command exits with an error."
    )]
    UploadDescriptions {
        #[arg(short = 'd', long, help = "Descriptions directory")]
        dir: Option<PathBuf>,

        #[arg(short = 'e', long, help = "Description upload endpoint URL")]
        endpoint: Option<String>,

        #[arg(long, help = "Per-request timeout in seconds")]
        timeout: Option<u64>,

        #[arg(
            long,
            help = "Print the JSON batch instead of uploading it",
            long_help = "Parse all description files and print the JSON array that would be sent, \
                         without contacting the catalog service."
        )]
        dry_run: bool,
    },

    #[command(
        about = "Convert, upload images, then upload descriptions",
        long_about = "Run the whole workflow in order: convert images, upload the converted \
                      images, then upload the parsed descriptions. Directories and endpoints \
                      come from the configuration file or defaults."
    )]
    Run {
        #[command(flatten)]
        images: ImageArgs,

        #[arg(long, help = "Descriptions directory")]
        descriptions_dir: Option<PathBuf>,
    },
}

/// Conversion options shared by `convert` and `run`.
#[derive(ClapArgs, Debug, Default)]
pub struct ImageArgs {
    #[arg(short = 'd', long, help = "Images directory")]
    pub dir: Option<PathBuf>,

    #[arg(
        short = 'x',
        long,
        help = "Source image extension (default: tif)",
        long_help = "Extension of the source images, matched case-insensitively. Default: tif"
    )]
    pub extension: Option<String>,

    #[arg(short = 'w', long, help = "Target width in pixels (default: 600)")]
    pub width: Option<u32>,

    #[arg(short = 'H', long, help = "Target height in pixels (default: 400)")]
    pub height: Option<u32>,

    #[arg(
        short = 'f',
        long,
        help = "Output format (jpeg, png, webp)",
        long_help = "Output format written next to each source. Default: jpeg"
    )]
    pub format: Option<OutputFormat>,

    #[arg(
        short = 'q',
        long,
        help = "JPEG quality (1-100, default: 75)"
    )]
    pub quality: Option<u8>,

    #[arg(
        long,
        help = "Resampling filter (nearest, triangle, catmull-rom, gaussian, lanczos3)"
    )]
    pub filter: Option<ResampleFilter>,

    #[arg(
        short = 'j',
        long,
        help = "Number of conversion threads (default: 1)",
        long_help = "Number of threads converting images in parallel. \
                     The default of 1 processes files strictly one after another."
    )]
    pub jobs: Option<usize>,
}

impl ImageArgs {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(dir) = &self.dir {
            config.images_dir = dir.clone();
        }
        if let Some(extension) = &self.extension {
            config.image_extension = extension.clone();
        }
        if let Some(width) = self.width {
            config.target_width = width;
        }
        if let Some(height) = self.height {
            config.target_height = height;
        }
        if let Some(format) = self.format {
            config.output_format = format;
        }
        if let Some(quality) = self.quality {
            config.quality = quality;
        }
        if let Some(filter) = self.filter {
            config.resample_filter = filter;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
    }
}
