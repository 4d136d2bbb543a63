use clap::Parser;

/// Simulates spatial elections and compares the quality of the winners picked by
/// plurality, approval, instant-runoff and a random draw.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file with the benchmark settings
    /// (trials, candidates, voters, issues, seed, regenerateEachTrial).
    /// The command line options below override its values.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (default 100) The number of trials.
    #[clap(short, long, value_parser)]
    pub trials: Option<usize>,

    /// (default 25) The number of candidates in every election.
    #[clap(long, value_parser)]
    pub candidates: Option<usize>,

    /// (default 1000) The number of voters in every election.
    #[clap(long, value_parser)]
    pub voters: Option<usize>,

    /// (default 100) The number of issues of every participant.
    #[clap(long, value_parser)]
    pub issues: Option<usize>,

    /// (optional) Seed of the random generator. A seeded run is reproducible.
    #[clap(short, long, value_parser)]
    pub seed: Option<u64>,

    /// If passed as an argument, a new election is drawn for every trial.
    #[clap(long, takes_value = false)]
    pub regenerate: bool,

    /// (file path, 'stdout' or empty) Where to write the JSON report. Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference report in JSON format. If provided, votesim will
    /// check that the computed report matches the reference. Only meaningful with a seed.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
