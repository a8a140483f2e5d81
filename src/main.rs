// sharpscan: static-analysis front end for C# source

use std::path::Path;
use std::process::ExitCode;

use sharpscan::{MetricId, ScanConfig, ScanResult, Scanner};
use tracing_subscriber::EnvFilter;

fn print_usage(program: &str) {
    eprintln!("Usage: {} [options] <file-or-directory>", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --strict                  stop at the first file that fails to parse");
    eprintln!("  --ignore-header-comments  exclude license banners from comment metrics");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} src/                  # scan every .cs file under src/", program);
    eprintln!("  {} Program.cs            # scan a single file", program);
}

fn print_summary(result: &ScanResult) {
    let metrics = [
        ("files", MetricId::Files),
        ("lines", MetricId::Lines),
        ("lines of code", MetricId::LinesOfCode),
        ("comment lines", MetricId::CommentLines),
        ("commented-out code lines", MetricId::CommentedOutCodeLines),
        ("classes", MetricId::Classes),
        ("methods", MetricId::Methods),
        ("accessors", MetricId::Accessors),
        ("statements", MetricId::Statements),
        ("public API", MetricId::PublicApi),
        ("undocumented public API", MetricId::UndocumentedPublicApi),
    ];
    println!("Project summary");
    for (label, metric) in metrics {
        println!("  {:<26} {}", label, result.project_metric(metric) as u64);
    }
    let density = result.project_metric(MetricId::CommentDensity);
    println!("  {:<26} {:.1}%", "comment density", density * 100.0);

    if !result.failures.is_empty() {
        println!();
        println!("Files that failed to analyze:");
        for failure in &result.failures {
            println!("  {}: {}", failure.path.display(), failure.error);
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("sharpscan");

    let mut config = ScanConfig::default();
    let mut target: Option<&str> = None;
    for arg in &args[1..] {
        match arg.as_str() {
            "--strict" => config.stop_on_failure = true,
            "--ignore-header-comments" => config.ignore_header_comments = true,
            other if other.starts_with("--") => {
                eprintln!("Error: unknown option '{}'", other);
                print_usage(program);
                return ExitCode::FAILURE;
            }
            other => target = Some(other),
        }
    }

    let Some(target) = target else {
        eprintln!("Error: no input path provided");
        eprintln!();
        print_usage(program);
        return ExitCode::FAILURE;
    };

    let path = Path::new(target);
    if !path.exists() {
        eprintln!("Error: path '{}' not found", target);
        return ExitCode::FAILURE;
    }

    let scanner = match Scanner::new(config) {
        Ok(scanner) => scanner,
        Err(e) => {
            eprintln!("Grammar configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = if path.is_dir() {
        scanner.scan_directory(path)
    } else {
        scanner.scan_file(path)
    };

    match result {
        Ok(result) => {
            print_summary(&result);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Scan failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
