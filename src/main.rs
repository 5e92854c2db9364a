use clap::{Parser, Subcommand, ValueEnum};
use shard_gallery::{GalleryManager, config, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shard-gallery")]
#[command(about = "Catalog and browse a sharded image directory")]
#[command(long_about = "\
Catalog and browse a sharded image directory

Images live in a primary directory and numbered siblings that are created
as the catalog grows:

  static/
  ├── images/      # primary shard
  ├── images1/     # created once images/ holds max_per_shard files
  └── images2/

'refresh' catalogs new files and provisions the next shard when needed.
Scanning stops at the first missing number.

Run 'shard-gallery gen-config' to generate a documented gallery.toml.")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults are used if it does not exist)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Catalog database, overrides `database` from the config file
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Primary image directory, overrides `images_dir` from the config file
    #[arg(long, global = true)]
    images: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Catalog new images across all shards and provision shard capacity
    Refresh,
    /// List every image in gallery order
    List {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
        /// Include every device size profile
        #[arg(long)]
        sizes: bool,
    },
    /// Show image count and cursor position
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Record an image that is already on disk
    Add { filename: String, filepath: String },
    /// Remove an image from the gallery by catalog id
    Remove { id: i64 },
    /// Walk the cursor and show the image it lands on
    Show {
        /// Device class used to pick the size profile
        #[arg(long, default_value = "pc")]
        device: String,
        #[arg(long)]
        json: bool,
        /// Navigation steps applied in order, starting from the first image
        #[arg(value_enum)]
        steps: Vec<Step>,
    },
    /// Print a stock gallery.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum Step {
    Next,
    Prev,
    First,
    Last,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let open = || -> Result<GalleryManager, Box<dyn std::error::Error>> {
        let mut site = config::load_config(&cli.config)?;
        if let Some(db) = &cli.db {
            site.database = db.clone();
        }
        if let Some(images) = &cli.images {
            site.images_dir = images.clone();
        }
        Ok(GalleryManager::open(&site)?)
    };

    match &cli.command {
        Command::Refresh => {
            let mut gallery = open()?;
            println!("==> Scanning {}*", gallery.images_dir().display());
            let (summary, report) = gallery.refresh_with_report()?;
            output::print_refresh(&summary, Some(&report));
        }
        Command::List { json, sizes } => {
            let gallery = open()?;
            let images = gallery.all_images();
            if *json {
                println!("{}", serde_json::to_string_pretty(&images)?);
            } else {
                let current = gallery.index().current().map(|n| n.id);
                output::print_images(&images, current, *sizes);
            }
        }
        Command::Stats { json } => {
            let gallery = open()?;
            let stats = gallery.stats();
            if *json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                output::print_stats(&stats);
            }
        }
        Command::Add { filename, filepath } => {
            let mut gallery = open()?;
            if gallery.add_new_image(filename, filepath)? {
                println!("Added {}", filename);
            } else {
                println!("{} is already in the catalog", filename);
            }
        }
        Command::Remove { id } => {
            let mut gallery = open()?;
            if gallery.remove_image(*id)? {
                println!("Removed #{}", id);
            } else {
                println!("No image with id {}", id);
            }
        }
        Command::Show {
            device,
            json,
            steps,
        } => {
            let mut gallery = open()?;
            for step in steps {
                match step {
                    Step::Next => gallery.navigate_next(),
                    Step::Prev => gallery.navigate_prev(),
                    Step::First => gallery.navigate_first(),
                    Step::Last => gallery.navigate_last(),
                };
            }
            let current = gallery.current_image_info(device);
            if *json {
                println!("{}", serde_json::to_string_pretty(&current)?);
            } else {
                output::print_current(current.as_ref(), device, &gallery.stats());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
