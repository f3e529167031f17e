use clap::Parser;
use std::path::PathBuf;

use docxside_check::{CheckOptions, SegmentationOptions, StyleSuggestions, StyleTemplate, ToleranceConfig};

#[derive(Parser)]
#[command(name = "docxside-check", about = "Check DOCX formatting against a style template")]
struct Args {
    /// Input DOCX file
    input: PathBuf,
    /// Style template JSON file
    #[arg(short, long)]
    template: PathBuf,
    /// Tolerance JSON file (defaults are used when absent or unreadable)
    #[arg(long)]
    tolerance: Option<PathBuf>,
    /// Paragraph style suggestions, as JSON or `index,style` lines
    #[arg(long)]
    suggestions: Option<PathBuf>,
    /// Title of the first body chapter
    #[arg(long, default_value = "绪论")]
    first_chapter: String,
    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if !args.input.is_file() {
        eprintln!("Error: not a file: {}", args.input.display());
        std::process::exit(1);
    }

    let template = match StyleTemplate::load(&args.template) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error: {}: {e}", args.template.display());
            std::process::exit(1);
        }
    };

    let suggestions = match args.suggestions.as_deref().map(StyleSuggestions::load).transpose() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let options = CheckOptions {
        tolerance: args
            .tolerance
            .as_deref()
            .map(ToleranceConfig::load)
            .unwrap_or_default(),
        suggestions,
        segmentation: SegmentationOptions {
            first_chapter_title: args.first_chapter,
            ..SegmentationOptions::default()
        },
    };

    let report = match docxside_check::check_docx(&args.input, &template, &options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if args.json {
        match report.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    } else if report.is_clean() {
        println!("No formatting differences found.");
    } else {
        print!("{}", report.render_text());
        println!("\n{} differences", report.summary.total_differences);
    }
}
