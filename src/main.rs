use anyhow::Result;
use clap::Parser;
use colored::*;
use snapweb::{BrowserOptions, ConvertOptions, Converter, LoaderOptions, OutputFormat};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "snapweb")]
#[command(about = "Convert a webpage to a specified output format (pdf for now, more will be added).")]
#[command(version)]
struct Args {
    /// The URL of the webpage to convert
    url: String,

    /// Output format: 'pdf' ('markdown' and 'epub' are not implemented yet)
    #[arg(short = 't', long = "type", default_value = "pdf")]
    format: String,

    /// Output file path (defaults to the page title with the format's extension)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Seconds to wait for all images to finish loading
    #[arg(long = "image-timeout", default_value = "10.0", value_parser = parse_timeout)]
    image_timeout: f64,

    /// Seconds to wait for navigation to reach network idle
    #[arg(long = "nav-timeout", default_value = "30.0", value_parser = parse_timeout)]
    nav_timeout: f64,

    /// Seconds any single browser call (printing included) may take
    #[arg(long = "request-timeout", default_value = "300.0", value_parser = parse_timeout)]
    request_timeout: f64,

    /// Path to the Chrome/Chromium executable
    #[arg(long = "chrome")]
    chrome: Option<PathBuf>,

    /// Launch Chrome with --no-sandbox (needed in some containers)
    #[arg(long = "no-sandbox")]
    no_sandbox: bool,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headed: bool,
}

impl Args {
    fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            browser: BrowserOptions {
                headless: !self.headed,
                chrome_executable: self.chrome.clone(),
                no_sandbox: self.no_sandbox,
                request_timeout: Duration::from_secs_f64(self.request_timeout),
                ..Default::default()
            },
            loader: LoaderOptions {
                navigation_timeout: Duration::from_secs_f64(self.nav_timeout),
                image_timeout: Duration::from_secs_f64(self.image_timeout),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

fn parse_timeout(s: &str) -> Result<f64, String> {
    let value = s.parse::<f64>().map_err(|_| "Not a number.")?;
    if !value.is_finite() || value <= 0.0 {
        return Err("Must be a positive number.".to_string());
    }
    Ok(value)
}

async fn run(args: Args, format: OutputFormat) -> Result<()> {
    let converter = Converter::new(args.convert_options());

    info!("Converting \"{}\" to {}", args.url.green(), format);
    let path = converter
        .convert(&args.url, format, args.output.as_deref())
        .await?;

    println!("{} saved as {}", format.label(), path.display());
    Ok(())
}

#[tokio::main]
async fn main() {
    // Set up logging with chromiumoxide errors suppressed
    let filter = EnvFilter::from_default_env()
        .add_directive("chromiumoxide::conn=off".parse().unwrap())
        .add_directive("chromiumoxide::handler=off".parse().unwrap())
        .add_directive("snapweb=info".parse().unwrap());

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let args = Args::parse();

    let format = match args.format.parse::<OutputFormat>() {
        Ok(format) => format,
        Err(_) => {
            println!("Unsupported output format: {}", args.format);
            process::exit(1);
        }
    };

    if let Err(e) = run(args, format).await {
        error!("{}", format!("Error: {}", e).red());
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timeout_rejects_zero_negative_and_garbage() {
        assert_eq!(parse_timeout("10"), Ok(10.0));
        assert_eq!(parse_timeout("0.5"), Ok(0.5));
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("0.0").is_err());
        assert!(parse_timeout("-1").is_err());
        assert!(parse_timeout("ten").is_err());
        assert!(parse_timeout("inf").is_err());
    }

    #[test]
    fn type_flag_defaults_to_pdf() {
        let args = Args::parse_from(["snapweb", "https://example.com"]);
        assert_eq!(args.format, "pdf");
        assert!(args.output.is_none());
        assert_eq!(args.image_timeout, 10.0);
    }

    #[test]
    fn flags_flow_into_options() {
        let args = Args::parse_from([
            "snapweb",
            "https://example.com",
            "-t",
            "PDF",
            "-o",
            "out.pdf",
            "--image-timeout",
            "2.5",
            "--no-sandbox",
        ]);
        let options = args.convert_options();
        assert_eq!(options.loader.image_timeout, Duration::from_millis(2500));
        assert!(options.browser.no_sandbox);
        assert!(options.browser.headless);
        assert_eq!(options.browser.request_timeout, Duration::from_secs(300));
        assert_eq!(args.output, Some(PathBuf::from("out.pdf")));
    }
}
