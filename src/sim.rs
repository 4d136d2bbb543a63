use log::{debug, info, warn};

use serde_json::json;
use serde_json::Value as JSValue;
use snafu::{prelude::*, Snafu};
use spatial_voting::benchmark::run_benchmark;
use spatial_voting::*;
use std::fs;
use text_diff::print_diff;

use crate::args::Args;
use crate::sim::config_reader::*;

#[derive(Debug, Snafu)]
pub enum SimError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing report to {path}"))]
    WritingReport {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Simulation failed"))]
    Simulation { source: VotingErrors },
    #[snafu(display("Difference detected between calculated report and reference report"))]
    ReferenceMismatch {},
}

pub type SimResult<T> = Result<T, SimError>;

pub mod config_reader {
    use crate::sim::*;

    pub fn read_config(path: &str) -> SimResult<BenchmarkConfig> {
        let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
        debug!("read content: {:?}", contents);
        let config: BenchmarkConfig =
            serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
        Ok(config)
    }

    /// The content of a JSON report, as written and pretty-printed.
    pub fn read_report(path: &str) -> SimResult<(String, String)> {
        let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
        let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
        let pretty = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})?;
        Ok((contents.trim_end().to_string(), pretty))
    }

    /// The configuration file if any (or the defaults), then the command line.
    pub fn build_config(args: &Args) -> SimResult<BenchmarkConfig> {
        let mut config = match args.config.as_deref() {
            Some(path) => {
                info!("Reading configuration from {:?}", path);
                read_config(path)?
            }
            None => BenchmarkConfig::DEFAULT,
        };
        if let Some(trials) = args.trials {
            config.trials = trials;
        }
        if let Some(candidates) = args.candidates {
            config.candidates = candidates;
        }
        if let Some(voters) = args.voters {
            config.voters = voters;
        }
        if let Some(issues) = args.issues {
            config.issues = issues;
        }
        if args.seed.is_some() {
            config.seed = args.seed;
        }
        if args.regenerate {
            config.regenerate_each_trial = true;
        }
        Ok(config)
    }
}

fn result_to_json(config: &BenchmarkConfig, res: &BenchmarkResult) -> JSValue {
    let results: Vec<JSValue> = res
        .scores
        .iter()
        .map(|(method, score)| json!({"method": method, "quality": score}))
        .collect();
    json!({"config": config, "results": results})
}

fn write_report(out: Option<&str>, pretty_js: &str) -> SimResult<()> {
    match out {
        None | Some("") | Some("stdout") => {
            println!("{}", pretty_js);
        }
        Some(path) => {
            info!("Writing report to {:?}", path);
            fs::write(path, pretty_js).context(WritingReportSnafu { path })?;
        }
    }
    Ok(())
}

pub fn run_simulation(args: &Args) -> SimResult<JSValue> {
    let config = build_config(args)?;
    info!("config: {:?}", config);

    let res = run_benchmark(&config).context(SimulationSnafu {})?;
    let result_js = result_to_json(&config, &res);
    let pretty_js = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_report(args.out.as_deref(), &pretty_js)?;

    // The reference report, if provided for comparison
    if let Some(reference_p) = args.reference.as_deref() {
        let (raw_reference, pretty_reference) = read_report(reference_p)?;
        if raw_reference != pretty_js && pretty_reference != pretty_js {
            warn!("Found differences with the reference report");
            print_diff(pretty_reference.as_str(), pretty_js.as_str(), "\n");
            return ReferenceMismatchSnafu {}.fail();
        }
        info!("Report matches reference {:?}", reference_p);
    }

    Ok(result_js)
}
