use std::io;
use std::net::IpAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bench_result_lib::chart::{self, RenderConfig};
use bench_result_lib::{ResultFile, Series, Window, DEFAULT_RESULT_PATH};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rocket::figment::Figment;
use rocket::http::ContentType;
use rocket::serde::{json::Json, Serialize};
use rocket::{Build, Rocket, State};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[macro_use]
extern crate rocket;

/// Print or chart the proof and verify timings of a Merkle tree benchmark run.
#[derive(Parser, Debug)]
#[command(version)]
struct Cli {
    /// Result file written by the benchmark harness.
    #[arg(long, default_value = DEFAULT_RESULT_PATH)]
    file: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print proof timings in seconds, then verify timings, one per line (default).
    Print,
    /// Chart one window of the result file.
    Plot(PlotArgs),
}

#[derive(Args, Debug)]
struct PlotArgs {
    #[arg(long, value_enum, default_value_t = WindowArg::Proof)]
    window: WindowArg,

    /// Write the chart to this SVG file instead of serving it.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Address the chart server binds to. Defaults to Rocket's configuration.
    #[arg(long)]
    address: Option<IpAddr>,

    /// Port the chart server listens on. Defaults to Rocket's configuration.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
enum WindowArg {
    Proof,
    Verify,
}

impl From<WindowArg> for Window {
    fn from(arg: WindowArg) -> Self {
        match arg {
            WindowArg::Proof => Window::Proof,
            WindowArg::Verify => Window::Verify,
        }
    }
}

#[get("/")]
fn chart_svg(state: &State<AppState>) -> (ContentType, String) {
    (ContentType::SVG, state.svg.clone())
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
struct SeriesView {
    title: &'static str,
    x_label: &'static str,
    y_label: &'static str,
    points: Vec<(u32, f64)>,
}

#[get("/series")]
fn series(state: &State<AppState>) -> Json<SeriesView> {
    let series = &state.series;

    Json(SeriesView {
        title: series.title(),
        x_label: series.x_label(),
        y_label: series.y_label(),
        points: series.points().to_vec(),
    })
}

#[get("/fingerprint")]
fn fingerprint(state: &State<AppState>) -> String {
    state.fingerprint.clone()
}

struct AppState {
    series: Series,
    svg: String,
    fingerprint: String,
}

impl AppState {
    fn new(results: &ResultFile, window: Window) -> bench_result_lib::Result<Self> {
        let series = results.series(window)?;
        let svg = chart::render_svg(&series)?;

        Ok(AppState {
            series,
            svg,
            fingerprint: results.fingerprint().to_string(),
        })
    }
}

fn chart_server(state: AppState, figment: Figment) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(state)
        .mount("/", routes![chart_svg, series, fingerprint])
}

fn print_report(results: &ResultFile) -> Result<()> {
    let stdout = io::stdout();
    bench_result_lib::write_report(results, &mut stdout.lock()).context("print mode failed")
}

async fn plot(results: &ResultFile, args: PlotArgs) -> Result<()> {
    let window = Window::from(args.window);
    let state = AppState::new(results, window)
        .with_context(|| format!("failed to chart the {window} window"))?;

    if let Some(output) = args.output {
        std::fs::write(&output, &state.svg)
            .with_context(|| format!("failed to write chart to `{}`", output.display()))?;
        info!(path = %output.display(), %window, "wrote chart");
        return Ok(());
    }

    let mut figment = rocket::Config::figment();
    if let Some(address) = args.address {
        figment = figment.merge(("address", address));
    }
    if let Some(port) = args.port {
        figment = figment.merge(("port", port));
    }

    info!(%window, "serving chart until shutdown");
    chart_server(state, figment)
        .launch()
        .await
        .map_err(|err| anyhow::anyhow!("chart server failed: {err}"))?;

    Ok(())
}

#[rocket::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string())),
        )
        .init();

    let cli = Cli::parse();

    chart::configure_rendering(RenderConfig::default())?;
    let results = ResultFile::load(&cli.file)?;

    match cli.command.unwrap_or(Command::Print) {
        Command::Print => {
            info!(path = %cli.file.display(), "printing proof and verify timings");
            print_report(&results)
        }
        Command::Plot(args) => plot(&results, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bench_result_lib::{util, WINDOW_LEN};
    use clap::CommandFactory;
    use rocket::http::Status;
    use rocket::local::blocking::Client;
    use rocket::serde::json::Value;

    fn results() -> ResultFile {
        ResultFile::parse(&util::generate_result_text(WINDOW_LEN))
    }

    fn client(window: Window) -> Client {
        let state = AppState::new(&results(), window).unwrap();
        Client::tracked(chart_server(state, rocket::Config::figment())).unwrap()
    }

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn it_prints_by_default() {
        let cli = Cli::try_parse_from(["bench-result-plot"]).unwrap();

        assert_eq!(cli.file, PathBuf::from("result"));
        assert!(cli.command.is_none());
    }

    #[test]
    fn it_can_parse_plot_arguments() {
        let cli = Cli::try_parse_from([
            "bench-result-plot",
            "--file",
            "bench/result",
            "plot",
            "--window",
            "verify",
            "--output",
            "verify.svg",
        ])
        .unwrap();

        assert_eq!(cli.file, PathBuf::from("bench/result"));
        match cli.command {
            Some(Command::Plot(args)) => {
                assert_eq!(args.window, WindowArg::Verify);
                assert_eq!(args.output, Some(PathBuf::from("verify.svg")));
                assert!(args.port.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn it_rejects_unknown_windows() {
        assert!(Cli::try_parse_from(["bench-result-plot", "plot", "--window", "build"]).is_err());
    }

    #[test]
    fn it_serves_the_chart() {
        let client = client(Window::Verify);
        let response = client.get("/").dispatch();

        assert_eq!(response.status(), Status::Ok);
        assert_eq!(response.content_type(), Some(ContentType::SVG));
        assert!(response.into_string().unwrap().contains("verify耗时"));
    }

    #[test]
    fn it_serves_the_series() {
        let client = client(Window::Proof);
        let response = client.get("/series").dispatch();

        assert_eq!(response.status(), Status::Ok);
        let json = response.into_json::<Value>().unwrap();
        assert_eq!(json["title"], "proof耗时");
        assert_eq!(json["x_label"], "Merkle Tree size");
        assert_eq!(json["y_label"], "time cost (ms)");
        assert_eq!(json["points"].as_array().unwrap().len(), WINDOW_LEN);
        assert_eq!(json["points"][0][0], 1);
        assert_eq!(json["points"][0][1], 1500.0);
    }

    #[test]
    fn it_serves_the_fingerprint() {
        let client = client(Window::Proof);
        let response = client.get("/fingerprint").dispatch();

        assert_eq!(response.into_string().unwrap(), results().fingerprint());
    }

    #[test]
    fn it_can_write_the_chart_to_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("proof.svg");
        let args = PlotArgs {
            window: WindowArg::Proof,
            output: Some(output.clone()),
            address: None,
            port: None,
        };

        rocket::execute(plot(&results(), args)).unwrap();

        let svg = std::fs::read_to_string(output).unwrap();
        assert!(svg.contains("proof耗时"));
    }
}
