use anyhow::{Context, Result, bail};
use clap::Parser;
use flag_color_mix::{
    ColorExtractor, Corpus, ExtractOptions, PixelGrid, corpus::country_name, downscale, explore,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Extract dominant flag colors and their weighted / equal mixes.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more flag image paths. A file stem that is a known country
    /// code (e.g. `fr.png`) is reported under the country's name.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Number of colors to extract per flag
    #[arg(short = 'k', long, default_value_t = flag_color_mix::DEFAULT_K)]
    n_colors: usize,

    /// Downscale so the longest side is at most this many pixels before clustering
    #[arg(short, long)]
    downscale: Option<u32>,

    /// JSON file with extraction options (seed, max_iterations, convergence, min_proportion)
    #[arg(long)]
    options: Option<PathBuf>,

    /// Write all palettes as a JSON document to this path
    #[arg(short, long)]
    json: Option<PathBuf>,

    /// Also group all extracted palette colors into this many clusters
    #[arg(short, long)]
    groups: Option<usize>,
}

fn load_options(path: Option<&Path>) -> Result<ExtractOptions> {
    let Some(path) = path else {
        return Ok(ExtractOptions::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let options: ExtractOptions =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    options.validate()?;
    Ok(options)
}

fn label_for(input: &Path) -> String {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    match country_name(&stem) {
        Some(name) => name.to_string(),
        None => stem.into_owned(),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let options = load_options(args.options.as_deref())?;
    let mut corpus = Corpus::new();

    for input in &args.inputs {
        let img = image::open(input).with_context(|| format!("decoding {}", input.display()))?;
        let img = match args.downscale {
            Some(side) => downscale(img, side),
            None => img,
        };
        let grid = PixelGrid::from(&img);

        let mut extractor = ColorExtractor::with_options(&grid, options.clone());
        let result = extractor
            .extract(args.n_colors)
            .with_context(|| format!("extracting colors from {}", input.display()))?
            .clone();
        if !result.converged() {
            warn!(input = %input.display(), "clustering did not converge, colors may be unstable");
        }
        let weighted = extractor.weighted_mix()?;
        let equal = extractor.equal_mix()?;

        let label = label_for(input);
        println!("{label}");
        for share in &result {
            println!("  {} {:>6.1}%", share.color, share.proportion * 100.0);
        }
        println!("  weighted mix {weighted}");
        println!("  equal mix    {equal}");

        corpus.insert_result(label, &result);
    }

    if let Some(path) = &args.json {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, corpus.to_json_pretty()?)?;
        info!(palettes = corpus.len(), "Saved → {}", path.display());
    }

    if let Some(n) = args.groups {
        if n == 0 {
            bail!("--groups must be at least 1");
        }
        let groups = explore::cluster_palette_colors(&corpus, n, &options)
            .context("grouping palette colors")?;
        for (idx, group) in groups.iter().enumerate() {
            let countries: Vec<&str> = group.countries.iter().map(String::as_str).collect();
            println!("group {} {}: {}", idx + 1, group.center, countries.join(", "));
        }
    }

    Ok(())
}
