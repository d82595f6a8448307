#![deny(missing_docs)]
//! GeoLens command-line interface.
//!
//! Renders the geographic section of a repository from a local statistics
//! file or from a GeoLens server.

mod client;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use client::{DEFAULT_SERVER_URL, StatsClient};
use geolens_core::{
    CountryStat, DEFAULT_TOP_N, GeoSectionView, Metric, RepoRef, SectionConfig, WorldFeatures,
    build_section, parse_country_stats, render_json, render_section_markdown,
    render_section_text,
};
use std::path::{Path, PathBuf};

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[derive(Parser)]
#[command(name = "geolens", version, about = "GeoLens CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct ServerArgs {
    /// GeoLens server base URL.
    #[arg(long, env = "GEOLENS_API_URL", default_value = DEFAULT_SERVER_URL)]
    server: String,
}

#[derive(Args, Clone)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(&["stats", "owner"])
))]
struct SourceArgs {
    /// JSON file holding the repository's country statistics.
    #[arg(long, conflicts_with_all = ["owner", "repo"])]
    stats: Option<PathBuf>,
    /// Repository owner, read from the server.
    #[arg(long, requires = "repo")]
    owner: Option<String>,
    /// Repository name, read from the server.
    #[arg(long, requires = "owner")]
    repo: Option<String>,
    #[command(flatten)]
    server: ServerArgs,
}

#[derive(Args, Clone)]
struct RepoArgs {
    /// Repository owner.
    #[arg(long)]
    owner: String,
    /// Repository name.
    #[arg(long)]
    repo: String,
    #[command(flatten)]
    server: ServerArgs,
}

#[derive(Args, Clone)]
struct SectionArgs {
    /// Metric shown on the map.
    #[arg(long, value_enum, default_value_t = MetricArg::CommitsCount)]
    metric: MetricArg,
    /// Number of countries requested for the table.
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top: usize,
    /// World GeoJSON file used to report countries missing from the map.
    #[arg(long)]
    features: Option<PathBuf>,
}

#[derive(Args, Clone)]
struct OutputArgs {
    /// Output format for report data.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Write the report to a file instead of stdout.
    #[arg(long = "report-output")]
    report_output: Option<PathBuf>,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
    Markdown,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum MetricArg {
    #[value(name = "commits_count")]
    CommitsCount,
    #[value(name = "contributors_count")]
    ContributorsCount,
    #[value(name = "commits_perc")]
    CommitsPerc,
    #[value(name = "contributors_perc")]
    ContributorsPerc,
}

impl From<MetricArg> for Metric {
    fn from(value: MetricArg) -> Self {
        match value {
            MetricArg::CommitsCount => Metric::CommitsCount,
            MetricArg::ContributorsCount => Metric::ContributorsCount,
            MetricArg::CommitsPerc => Metric::CommitsPerc,
            MetricArg::ContributorsPerc => Metric::ContributorsPerc,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render the map domain, ranked table, and insights of a repository.
    Render {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        section: SectionArgs,
        #[command(flatten)]
        report: OutputArgs,
    },
    /// Download a repository's raw country statistics as JSON.
    Fetch {
        #[command(flatten)]
        repo: RepoArgs,
        /// Write the statistics to a file instead of stdout.
        #[arg(long = "report-output")]
        report_output: Option<PathBuf>,
    },
}

/// Where the statistics of a render come from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RecordSource {
    File(PathBuf),
    Server { server_url: String, repo: RepoRef },
}

impl RecordSource {
    fn label(&self) -> String {
        match self {
            RecordSource::File(path) => path.display().to_string(),
            RecordSource::Server { repo, .. } => repo.to_string(),
        }
    }
}

#[cfg(not(test))]
#[tokio::main]
async fn main() -> CliResult<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            source,
            section,
            report,
        } => {
            let source = resolve_source_args(&source)?;
            run_render(source, section, report).await?
        }
        Commands::Fetch {
            repo,
            report_output,
        } => run_fetch(repo, report_output).await?,
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

fn resolve_source_args(args: &SourceArgs) -> CliResult<RecordSource> {
    if let Some(path) = &args.stats {
        return Ok(RecordSource::File(path.clone()));
    }
    match (&args.owner, &args.repo) {
        (Some(owner), Some(repo)) => Ok(RecordSource::Server {
            server_url: args.server.server.clone(),
            repo: RepoRef::new(owner.as_str(), repo.as_str()),
        }),
        _ => Err("provide --stats or both --owner and --repo".into()),
    }
}

async fn load_records(source: &RecordSource) -> CliResult<Vec<CountryStat>> {
    match source {
        RecordSource::File(path) => {
            let text = tokio::fs::read_to_string(path).await?;
            Ok(parse_country_stats(&text)?)
        }
        RecordSource::Server { server_url, repo } => {
            StatsClient::new(server_url)?.fetch_country_stats(repo).await
        }
    }
}

async fn warn_unmatched(features: &Path, records: &[CountryStat]) -> CliResult<()> {
    let text = tokio::fs::read_to_string(features).await?;
    let world = WorldFeatures::from_geojson_str(&text)?;
    for country in world.unmatched_countries(records) {
        eprintln!("warning: no world feature for country {country}");
    }
    Ok(())
}

async fn run_render(
    source: RecordSource,
    section: SectionArgs,
    report: OutputArgs,
) -> CliResult<()> {
    let records = load_records(&source).await?;
    if let Some(features) = &section.features {
        warn_unmatched(features, &records).await?;
    }
    let config = SectionConfig::default().with_top_n(section.top);
    let view = build_section(&records, section.metric.into(), &config)?;
    let contents = render_view(&source.label(), &view, report.format)?;
    emit_output(&report, contents).await
}

async fn run_fetch(args: RepoArgs, report_output: Option<PathBuf>) -> CliResult<()> {
    let repo = RepoRef::new(args.owner, args.repo);
    let records = StatsClient::new(&args.server.server)?
        .fetch_country_stats(&repo)
        .await?;
    let mut contents = render_json(&records)?;
    contents.push('\n');
    let output = OutputArgs {
        format: OutputFormat::Json,
        report_output,
    };
    emit_output(&output, contents).await
}

fn render_view(label: &str, view: &GeoSectionView, format: OutputFormat) -> CliResult<String> {
    Ok(match format {
        OutputFormat::Text => render_section_text(label, view),
        OutputFormat::Markdown => render_section_markdown(label, view),
        OutputFormat::Json => {
            let mut json = render_json(view)?;
            json.push('\n');
            json
        }
    })
}

async fn emit_output(output: &OutputArgs, contents: String) -> CliResult<()> {
    if let Some(path) = &output.report_output {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, contents).await?;
    } else {
        print!("{contents}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use std::sync::atomic::AtomicUsize;

    static UNIQUE_COUNTER: AtomicUsize = AtomicUsize::new(0);

    const STATS: &str = r#"[
        {"country": "USA", "commits_count": 60, "contributors_count": 2,
         "commits_perc": 0.6, "contributors_perc": 0.2},
        {"country": null, "commits_count": 10, "contributors_count": 1,
         "commits_perc": 0.1, "contributors_perc": 0.1},
        {"country": "XKX", "commits_count": 30, "contributors_count": 7,
         "commits_perc": 0.3, "contributors_perc": 0.7}
    ]"#;

    fn unique_dir_name() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let counter = UNIQUE_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        PathBuf::from(format!("geolens_cli_test_{nanos}_{counter}"))
    }

    fn temp_root() -> PathBuf {
        let root = std::env::temp_dir().join(unique_dir_name());
        std::fs::create_dir_all(&root).expect("create temp dir");
        root
    }

    fn section_args(metric: MetricArg, top: usize) -> SectionArgs {
        SectionArgs {
            metric,
            top,
            features: None,
        }
    }

    #[test]
    fn cli_parses_render_from_file() {
        let cli = Cli::try_parse_from([
            "geolens",
            "render",
            "--stats",
            "stats.json",
            "--metric",
            "contributors_count",
            "--top",
            "3",
            "--format",
            "markdown",
        ])
        .expect("parse");
        match cli.command {
            Commands::Render {
                source,
                section,
                report,
            } => {
                assert_eq!(
                    resolve_source_args(&source).expect("source"),
                    RecordSource::File(PathBuf::from("stats.json"))
                );
                assert_eq!(section.metric, MetricArg::ContributorsCount);
                assert_eq!(section.top, 3);
                assert_eq!(report.format, OutputFormat::Markdown);
            }
            Commands::Fetch { .. } => panic!("expected render"),
        }
    }

    #[test]
    fn cli_parses_render_from_server() {
        let cli = Cli::try_parse_from([
            "geolens",
            "render",
            "--server",
            "http://geo.example.com",
            "--owner",
            "octo",
            "--repo",
            "geo",
        ])
        .expect("parse");
        let Commands::Render { source, .. } = cli.command else {
            panic!("expected render");
        };
        assert_eq!(
            resolve_source_args(&source).expect("source"),
            RecordSource::Server {
                server_url: "http://geo.example.com".to_string(),
                repo: RepoRef::new("octo", "geo"),
            }
        );
    }

    #[test]
    fn cli_requires_a_source() {
        assert!(Cli::try_parse_from(["geolens", "render"]).is_err());
        assert!(Cli::try_parse_from(["geolens", "render", "--owner", "octo"]).is_err());
        assert!(
            Cli::try_parse_from([
                "geolens", "render", "--stats", "a.json", "--owner", "o", "--repo", "r"
            ])
            .is_err()
        );
    }

    #[test]
    fn metric_arg_maps_to_core_metric() {
        assert_eq!(Metric::from(MetricArg::CommitsCount), Metric::CommitsCount);
        assert_eq!(
            Metric::from(MetricArg::ContributorsPerc),
            Metric::ContributorsPerc
        );
    }

    #[tokio::test]
    async fn render_from_file_writes_markdown() {
        let root = temp_root();
        let stats = root.join("stats.json");
        std::fs::write(&stats, STATS).expect("write stats");
        let out = root.join("out/report.md");

        run_render(
            RecordSource::File(stats),
            section_args(MetricArg::CommitsCount, 5),
            OutputArgs {
                format: OutputFormat::Markdown,
                report_output: Some(out.clone()),
            },
        )
        .await
        .expect("render");

        let contents = std::fs::read_to_string(&out).expect("read report");
        assert!(contents.contains("| USA | 60.0% |"));
        assert!(contents.contains("| XKX | 30.0% |"));
        assert!(contents.contains("(USA)"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn render_json_respects_metric_and_top() {
        let root = temp_root();
        let stats = root.join("stats.json");
        std::fs::write(&stats, STATS).expect("write stats");
        let out = root.join("report.json");

        run_render(
            RecordSource::File(stats),
            section_args(MetricArg::ContributorsCount, 0),
            OutputArgs {
                format: OutputFormat::Json,
                report_output: Some(out.clone()),
            },
        )
        .await
        .expect("render");

        let view: GeoSectionView =
            serde_json::from_str(&std::fs::read_to_string(&out).expect("read")).expect("json");
        assert_eq!(view.table_metric, Metric::ContributorsPerc);
        assert_eq!(view.table.len(), 1);
        assert_eq!(view.table[0].label(), "XKX");
        assert_eq!(view.domain.upper, Some(7.0));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn render_rejects_invalid_file() {
        let root = temp_root();
        let stats = root.join("stats.json");
        std::fs::write(&stats, r#"[{"country":"USA","commits_perc":60}]"#).expect("write stats");

        let err = run_render(
            RecordSource::File(stats),
            section_args(MetricArg::CommitsCount, 5),
            OutputArgs {
                format: OutputFormat::Text,
                report_output: Some(root.join("unused.txt")),
            },
        )
        .await
        .expect_err("invalid");
        assert!(err.to_string().contains("invalid record"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn render_checks_world_features() {
        let root = temp_root();
        let stats = root.join("stats.json");
        std::fs::write(&stats, STATS).expect("write stats");
        let world = root.join("world.json");
        std::fs::write(&world, r#"{"type":"FeatureCollection","features":[]}"#)
            .expect("write world");

        let mut section = section_args(MetricArg::CommitsCount, 5);
        section.features = Some(world);
        run_render(
            RecordSource::File(stats),
            section,
            OutputArgs {
                format: OutputFormat::Text,
                report_output: Some(root.join("report.txt")),
            },
        )
        .await
        .expect("render");

        let bad_world = root.join("bad.json");
        std::fs::write(&bad_world, r#"{"type":"Point","coordinates":[0.0,0.0]}"#)
            .expect("write bad world");
        let mut section = section_args(MetricArg::CommitsCount, 5);
        section.features = Some(bad_world);
        let err = run_render(
            RecordSource::File(root.join("stats.json")),
            section,
            OutputArgs {
                format: OutputFormat::Text,
                report_output: Some(root.join("report.txt")),
            },
        )
        .await
        .expect_err("bad world");
        assert!(err.to_string().contains("FeatureCollection"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn render_from_server_uses_remote_records() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/repos/octo/geo/countries");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(STATS);
            })
            .await;
        let root = temp_root();
        let out = root.join("report.txt");

        run_render(
            RecordSource::Server {
                server_url: server.base_url(),
                repo: RepoRef::new("octo", "geo"),
            },
            section_args(MetricArg::CommitsCount, 5),
            OutputArgs {
                format: OutputFormat::Text,
                report_output: Some(out.clone()),
            },
        )
        .await
        .expect("render");

        let contents = std::fs::read_to_string(&out).expect("read report");
        assert!(contents.starts_with("octo/geo (commits_count)"));
        assert!(contents.contains("USA  60.0%"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[tokio::test]
    async fn fetch_writes_raw_records() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/repos/octo/geo/countries");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(STATS);
            })
            .await;
        let root = temp_root();
        let out = root.join("nested/countries.json");

        run_fetch(
            RepoArgs {
                owner: "octo".to_string(),
                repo: "geo".to_string(),
                server: ServerArgs {
                    server: server.base_url(),
                },
            },
            Some(out.clone()),
        )
        .await
        .expect("fetch");

        let records = parse_country_stats(&std::fs::read_to_string(&out).expect("read"))
            .expect("records");
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].country, None);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn text_view_lists_placeholder_for_empty_repo() {
        let view = build_section(&[], Metric::CommitsCount, &SectionConfig::default())
            .expect("section");
        let text = render_view("empty.json", &view, OutputFormat::Text).expect("text");
        assert!(text.contains(geolens_core::NO_DATA_LABEL));
    }
}
