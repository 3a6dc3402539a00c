//! xtcbook CLI - XTC/XTCH container inspection tool

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use xtcbook::{read_chapters, read_info, read_page, DecodedPage};

#[derive(Parser)]
#[command(name = "xtcbook")]
#[command(version)]
#[command(about = "Inspect and unpack XTC/XTCH e-ink book containers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show container information
    Info {
        /// Input container file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the chapter table
    Chapters {
        /// Input container file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode one page to a PGM image
    Page {
        /// Input container file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Page number (1-based)
        #[arg(value_name = "PAGE")]
        page: u32,

        /// Output file (defaults to page-N.pgm)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Decode all pages to PGM images
    Extract {
        /// Input container file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Decode every page and report the first inconsistency
    Verify {
        /// Input container file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Info { input, json } => cmd_info(&input, json),
        Commands::Chapters { input, json } => cmd_chapters(&input, json),
        Commands::Page {
            input,
            page,
            output,
        } => cmd_page(&input, page, output.as_deref()),
        Commands::Extract { input, output } => cmd_extract(&input, output.as_deref()),
        Commands::Verify { input } => cmd_verify(&input),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let info = read_info(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", "Container".green().bold());
    println!("  {} {}", "format:".dimmed(), info.format);
    println!("  {} {}", "pages:".dimmed(), info.page_count);
    println!("  {} {}", "chapters:".dimmed(), info.chapter_count);
    println!("  {} {}", "title:".dimmed(), info.title);
    println!("  {} {}", "author:".dimmed(), info.author);
    Ok(())
}

fn cmd_chapters(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let chapters = read_chapters(input)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&chapters)?);
        return Ok(());
    }

    if chapters.is_empty() {
        println!("{}", "No chapters".yellow());
        return Ok(());
    }
    for (i, chapter) in chapters.iter().enumerate() {
        println!(
            "{:>4}  {}  {}",
            i + 1,
            format!("pages {:>4}-{:<4}", chapter.start_page, chapter.end_page).dimmed(),
            chapter.title
        );
    }
    Ok(())
}

fn cmd_page(
    input: &Path,
    page_number: u32,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = read_page(input, page_number)?;

    let path = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(format!("page-{page_number}.pgm")));
    write_pgm(&path, &page)?;

    println!(
        "{} page {} ({}x{}, {}) to {}",
        "Decoded".green(),
        page_number,
        page.width,
        page.height,
        page.format,
        path.display()
    );
    Ok(())
}

fn cmd_extract(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let info = read_info(input)?;

    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_pages", stem))
    });
    fs::create_dir_all(&output_dir)?;

    let pb = progress_bar(u64::from(info.page_count));
    for number in 1..=info.page_count {
        let page = read_page(input, number)?;
        write_pgm(&output_dir.join(format!("page-{number:04}.pgm")), &page)?;
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    println!(
        "{} {} pages to {}",
        "Extracted".green(),
        info.page_count,
        output_dir.display()
    );
    Ok(())
}

fn cmd_verify(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let info = read_info(input)?;
    println!(
        "{} {} container, {} pages",
        "Verifying".green(),
        info.format,
        info.page_count
    );

    let expected = info.format.page_format();
    let pb = progress_bar(u64::from(info.page_count));
    for number in 1..=info.page_count {
        let page = read_page(input, number)
            .map_err(|e| format!("page {number}: {e}"))?;
        if page.format != expected {
            return Err(format!(
                "page {number} is {} inside a {} container",
                page.format, info.format
            )
            .into());
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    let chapters = read_chapters(input)?;
    for chapter in &chapters {
        if chapter.start_page == 0
            || chapter.start_page > chapter.end_page
            || chapter.end_page > info.page_count
        {
            return Err(format!(
                "chapter '{}' spans pages {}-{} of {}",
                chapter.title, chapter.start_page, chapter.end_page, info.page_count
            )
            .into());
        }
    }

    println!(
        "{}: {} pages, {} chapters",
        "OK".green().bold(),
        info.page_count,
        chapters.len()
    );
    Ok(())
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

/// Write a decoded page as a binary PGM (P5) grayscale image.
fn write_pgm(path: &Path, page: &DecodedPage) -> Result<(), Box<dyn std::error::Error>> {
    let raster = page.to_luminance();
    let mut file = fs::File::create(path)?;
    write!(file, "P5\n{} {}\n255\n", raster.width, raster.height)?;
    file.write_all(&raster.pixels)?;
    Ok(())
}
