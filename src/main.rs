use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use podnav::chapter::EmbeddedChapterImage;
use podnav::config::Config;
use podnav::drawer::NavTag;
use podnav::library::{DrawerDataSource, LibraryError, LibraryFile};
use podnav::preferences::PreferenceStore;
use podnav::publish::{rebuild_snapshot, run_reload_loop, ReloadEvent, SnapshotPublisher};
use podnav::ui::{buffer_lines, render_to_buffer, RenderContext};
use podnav::util::atomic_write;

/// How long a mutation waits for the reload loop to republish.
const REPUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// Width used when the terminal size is unknown.
const FALLBACK_WIDTH: u16 = 40;

/// Get the config directory path (~/.config/podnav/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("podnav"))
}

#[derive(Parser, Debug)]
#[command(name = "podnav", about = "Podcast navigation drawer")]
struct Args {
    /// Library export to read instead of the configured one
    #[arg(long, value_name = "PATH", global = true)]
    library: Option<PathBuf>,

    /// Render width in columns (defaults to the terminal width)
    #[arg(long, value_name = "N", global = true)]
    width: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the drawer
    Drawer,
    /// Hide navigation sections
    Hide {
        #[arg(required = true)]
        tags: Vec<NavTag>,
    },
    /// Show hidden navigation sections again
    Show {
        #[arg(required = true)]
        tags: Vec<NavTag>,
    },
    /// Expand a folder
    Open { folder: String },
    /// Collapse a folder
    Close { folder: String },
    /// Classify a chapter image locator, optionally extracting embedded bytes
    ChapterImage {
        locator: String,
        /// Media file holding the embedded image
        #[arg(long, value_name = "FILE", requires = "out")]
        media: Option<PathBuf>,
        /// Where to write the extracted image
        #[arg(long, value_name = "FILE", requires = "media")]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let command = args.command.unwrap_or(Command::Drawer);

    if let Command::ChapterImage {
        locator,
        media,
        out,
    } = &command
    {
        return chapter_image(locator, media.as_deref(), out.as_deref());
    }

    let config_dir = get_config_dir()?;
    let config = Config::load(&config_dir.join("config.toml")).context("Failed to load config")?;
    let library_path = args
        .library
        .clone()
        .or_else(|| config.library.clone())
        .unwrap_or_else(|| config_dir.join("library.toml"));

    let prefs = PreferenceStore::load(config.preferences(), config_dir.join("prefs.toml"))
        .context("Failed to load preferences")?;

    let source: Arc<dyn DrawerDataSource> = Arc::new(LibraryFile::new(&library_path));
    let initial = {
        let source = Arc::clone(&source);
        let current = prefs.current();
        tokio::task::spawn_blocking(move || source.load(&current))
            .await
            .context("Drawer data load task failed")?
    };
    let initial = match initial {
        Ok(data) => data,
        Err(LibraryError::NotFound(path)) => {
            eprintln!("Error: No library export found at {}", path.display());
            eprintln!();
            eprintln!("Point podnav at one with:");
            eprintln!("  podnav --library /path/to/library.toml");
            eprintln!();
            eprintln!("Or set `library` in {}.", config_dir.join("config.toml").display());
            std::process::exit(1);
        }
        Err(e) => return Err(e).context("Failed to load library"),
    };

    let publisher = SnapshotPublisher::new(rebuild_snapshot(&prefs.current(), initial));
    let mut snapshots = publisher.subscribe();
    snapshots.borrow_and_update();

    let (event_tx, event_rx) = mpsc::channel(8);
    let reload = tokio::spawn(run_reload_loop(
        source,
        prefs.subscribe(),
        event_rx,
        publisher.clone(),
    ));

    let changed = match &command {
        Command::Hide { tags } => prefs.hide(tags),
        Command::Show { tags } => prefs.show(tags),
        Command::Open { folder } => prefs.set_folder_open(folder, true),
        Command::Close { folder } => prefs.set_folder_open(folder, false),
        Command::Drawer | Command::ChapterImage { .. } => false,
    };

    if changed {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
        prefs.save().context("Failed to save preferences")?;
        match tokio::time::timeout(REPUBLISH_TIMEOUT, snapshots.changed()).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => tracing::warn!("Snapshot publisher closed before republishing"),
            Err(_) => tracing::warn!("Timed out waiting for drawer to rebuild"),
        }
    }

    // Receiver may be gone already if the loop stopped
    let _ = event_tx.send(ReloadEvent::Shutdown).await;
    if let Err(e) = reload.await {
        tracing::warn!(error = %e, "Reload loop task failed");
    }

    let width = args.width.unwrap_or_else(|| {
        crossterm::terminal::size()
            .map(|(cols, _)| cols)
            .unwrap_or(FALLBACK_WIDTH)
    });
    let snapshot = publisher.current();
    let buf = render_to_buffer(&RenderContext::default(), &snapshot, width);
    for line in buffer_lines(&buf) {
        println!("{line}");
    }
    Ok(())
}

fn chapter_image(locator: &str, media: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let image = match EmbeddedChapterImage::parse(locator) {
        Ok(image) => image,
        Err(e) => {
            tracing::debug!(error = %e, "Treating locator as external");
            println!("external: {locator}");
            return Ok(());
        }
    };
    println!(
        "embedded: mime={} offset={} length={}",
        image.mime(),
        image.position(),
        image.length()
    );

    if let (Some(media), Some(out)) = (media, out) {
        let file = std::fs::File::open(media)
            .with_context(|| format!("Failed to open media file '{}'", media.display()))?;
        let bytes = image
            .read_from(std::io::BufReader::new(file))
            .with_context(|| format!("Failed to read image from '{}'", media.display()))?;
        atomic_write(out, &bytes)
            .with_context(|| format!("Failed to write image to '{}'", out.display()))?;
        println!("Wrote {} bytes to {}", bytes.len(), out.display());
    }
    Ok(())
}
