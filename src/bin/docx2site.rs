//! CLI binary for docx2site.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExportConfig`, runs the export and the git publisher, and prints
//! results.

use anyhow::{Context, Result};
use clap::Parser;
use docx2site::{
    inspect, run, ExportConfig, ExportOutput, ExportProgressCallback, GitPublisher,
    ProgressCallback, PublishError, PublishOutcome, Publisher,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while the document is walked, then
/// one log line per image as it is captioned.
struct CliProgressCallback {
    bar: ProgressBar,
    superseded: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            superseded: AtomicUsize::new(0),
        })
    }
}

impl ExportProgressCallback for CliProgressCallback {
    fn on_export_start(&self, document_stem: &str) {
        self.bar.set_prefix("Exporting");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Exporting images of {document_stem}…"))
        ));
    }

    fn on_image_extracted(&self, index: usize, filename: &str) {
        self.bar.set_message(format!("image {index} ({filename})"));
    }

    fn on_image_captioned(&self, index: usize, filename: &str, caption: &str) {
        self.bar.println(format!(
            "  {} Image {:>3}  {:<40}  {}",
            green("✓"),
            index,
            caption,
            dim(filename),
        ));
    }

    fn on_image_superseded(&self, index: usize, filename: &str) {
        self.superseded.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!(
            "  {} Image {:>3}  {}  {}",
            yellow("⚠"),
            index,
            yellow("no caption before the next image, not indexed"),
            dim(filename),
        ));
    }

    fn on_page_written(&self, page_num: usize, total_pages: usize) {
        self.bar.set_prefix("Writing");
        self.bar.set_message(format!("page {page_num}/{total_pages}"));
    }

    fn on_export_complete(&self, image_count: usize) {
        self.bar.finish_and_clear();
        let superseded = self.superseded.load(Ordering::SeqCst);
        if superseded == 0 {
            eprintln!("{} {} images exported", green("✔"), bold(&image_count.to_string()));
        } else {
            eprintln!(
                "{} {} images exported  ({} left out)",
                cyan("⚠"),
                bold(&image_count.to_string()),
                yellow(&superseded.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Export and publish (git add / commit / push in the current repository)
  docx2site "Flood Report.docx"

  # Export only, inspect the result locally
  docx2site --no-push report.docx

  # Separate site repository, explicit push target
  docx2site --repo-dir ../site --docs-dir ../site/docs --remote origin --branch gh-pages report.docx

  # Jekyll front matter and a custom commit message
  docx2site --front-matter --message "Refresh figures" report.docx

  # Print document metadata only
  docx2site --inspect-only report.docx

  # JSON output with stats and publish outcome
  docx2site --json --no-push report.docx > export.json

OUTPUT LAYOUT:
  docs/<stem>/index.html                   links to every image page
  docs/<stem>/<image>.html                 one page per image
  docs/<stem>/images/img_NNN[_<slug>].ext  extracted image files

CAPTIONS:
  An image is captioned by the next paragraph that uses a "Caption" style,
  or by the next plain-text paragraph. Without one it is titled "Image N".
  An image directly followed by another image is left out of the index.

ENVIRONMENT VARIABLES:
  DOCX2SITE_DOCS_DIR      Site root (default: docs)
  DOCX2SITE_REPO_DIR      Git working tree (default: .)
  DOCX2SITE_REMOTE        Push remote
  DOCX2SITE_BRANCH        Push branch (requires a remote)
  DOCX2SITE_SITE_URL      Base URL printed after a successful push
  DOCX2SITE_FRONT_MATTER  Prepend Jekyll front matter
  DOCX2SITE_MESSAGE       Commit message
  DOCX2SITE_NO_PUSH       Skip git publishing
  RUST_LOG                Override the log filter
"#;

/// Export the images of a Word document as a static site and push it.
#[derive(Parser, Debug)]
#[command(
    name = "docx2site",
    version,
    about = "Export Word document images as captioned HTML pages and publish them with git",
    long_about = "Extract every image of a .docx file, pair it with the caption that follows it, \
write one HTML page per image plus an index under <docs-dir>/<stem>/, then stage, commit and \
push that directory.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Word document (.docx) to export.
    input: PathBuf,

    /// Root directory of the generated site.
    #[arg(long, env = "DOCX2SITE_DOCS_DIR", default_value = "docs")]
    docs_dir: PathBuf,

    /// Git working tree used for publishing.
    #[arg(long, env = "DOCX2SITE_REPO_DIR", default_value = ".")]
    repo_dir: PathBuf,

    /// Remote to push to (default: upstream of the current branch).
    #[arg(long, env = "DOCX2SITE_REMOTE")]
    remote: Option<String>,

    /// Branch to push; requires --remote.
    #[arg(long, env = "DOCX2SITE_BRANCH", requires = "remote")]
    branch: Option<String>,

    /// Base URL of the published site, e.g. https://user.github.io/repo.
    #[arg(long, env = "DOCX2SITE_SITE_URL")]
    site_url: Option<String>,

    /// Prepend Jekyll front matter to every generated page.
    #[arg(long, env = "DOCX2SITE_FRONT_MATTER")]
    front_matter: bool,

    /// Commit message (default: "Update images from <file name>").
    #[arg(short, long, env = "DOCX2SITE_MESSAGE")]
    message: Option<String>,

    /// Write the site but do not stage, commit or push.
    #[arg(long, env = "DOCX2SITE_NO_PUSH")]
    no_push: bool,

    /// Output structured JSON (export output and publish outcome).
    #[arg(long)]
    json: bool,

    /// Disable progress output.
    #[arg(long)]
    no_progress: bool,

    /// Print document metadata only, no export.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress display replaces INFO-level library logs.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "warn"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input).context("Failed to inspect document")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            println!("Title:        {}", meta.title);
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref h) = meta.first_heading {
                println!("Heading:      {}", h);
            }
            println!("Paragraphs:   {}", meta.paragraph_count);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExportProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Export and publish ───────────────────────────────────────────────
    let git = GitPublisher::new(&config.repo_dir)
        .with_target(config.remote.clone(), config.branch.clone());
    let publisher: Option<&dyn Publisher> = if cli.no_push { None } else { Some(&git) };

    let report = run(&cli.input, &config, publisher)
        .with_context(|| format!("Export of {} failed", cli.input.display()))?;
    let output = &report.export;

    if cli.json {
        println!("{}", report_json(output, report.publish.as_ref())?);
    } else if !cli.quiet {
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            output.stats.pages_written,
            output.stats.duration_ms,
            bold(&output.index_path().display().to_string()),
        );
        print_publish_summary(output, &config, report.publish.as_ref());
    }

    let output_root = output.output_root.clone();
    report.into_result().map(|_| ()).with_context(|| {
        format!(
            "Publishing failed; the generated files remain in {}",
            output_root.display()
        )
    })
}

/// Map CLI args to `ExportConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExportConfig> {
    let mut builder = ExportConfig::builder()
        .docs_dir(&cli.docs_dir)
        .repo_dir(&cli.repo_dir)
        .front_matter(cli.front_matter);

    if let Some(ref remote) = cli.remote {
        builder = builder.remote(remote);
    }
    if let Some(ref branch) = cli.branch {
        builder = builder.branch(branch);
    }
    if let Some(ref message) = cli.message {
        builder = builder.commit_message(message);
    }
    if let Some(ref url) = cli.site_url {
        builder = builder.site_url(url);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_publish_summary(
    output: &ExportOutput,
    config: &ExportConfig,
    published: Option<&Result<PublishOutcome, PublishError>>,
) {
    match published {
        None => eprintln!("   {}", dim("publishing skipped (--no-push)")),
        Some(Ok(PublishOutcome::NoChanges)) => {
            eprintln!("   {}", dim("no changes to publish"))
        }
        Some(Ok(PublishOutcome::Pushed)) => {
            eprintln!("{}  pushed", green("✔"));
            if let Some(url) = config.index_url(&output.document_stem) {
                eprintln!("   View it at {}", cyan(&url));
            }
        }
        Some(Err(e)) => eprintln!("{}  {}", red("✘"), red(&e.to_string())),
    }
}

fn report_json(
    output: &ExportOutput,
    published: Option<&Result<PublishOutcome, PublishError>>,
) -> Result<String> {
    let publish = match published {
        None => serde_json::Value::Null,
        Some(Ok(outcome)) => serde_json::to_value(outcome)?,
        Some(Err(e)) => serde_json::json!({ "error": e.to_string() }),
    };
    let report = serde_json::json!({
        "export": output,
        "publish": publish,
    });
    serde_json::to_string_pretty(&report).context("Failed to serialise output")
}
