#![forbid(unsafe_code)]
//! testbank command line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use testbank::commands::{
    execute_init, execute_manual, execute_modify, execute_question, execute_random,
    execute_records, CriteriaArgs, InitOptions, ManualOptions, ModifyOptions, QuestionOptions,
    RandomOptions, RecordsSubcommand,
};
use testbank::Config;

#[derive(Parser)]
#[command(name = "testbank")]
#[command(about = "Assemble tests from a question bank and track tester attempts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = testbank::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Question bank server URL (overrides the config file)
    #[arg(long, global = true, env = "TESTBANK_SERVER")]
    server: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip interactive prompts (answer yes, keep defaults)
    #[arg(short = 'y', long, global = true)]
    yes: bool,
}

/// Question filters; a filter left out matches everything
#[derive(Args, Debug, Clone, Default)]
struct CriteriaFlags {
    /// Bloom's taxonomy level
    #[arg(long)]
    blooms: Option<String>,

    #[arg(long)]
    subject: Option<String>,

    #[arg(long)]
    topic: Option<String>,

    #[arg(long)]
    training_level: Option<String>,

    #[arg(long)]
    question_type: Option<String>,

    #[arg(long)]
    difficulty: Option<String>,
}

impl From<CriteriaFlags> for CriteriaArgs {
    fn from(flags: CriteriaFlags) -> Self {
        CriteriaArgs {
            blooms_taxonomy: flags.blooms,
            subject: flags.subject,
            topic: flags.topic,
            training_level: flags.training_level,
            question_type: flags.question_type,
            question_difficulty: flags.difficulty,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write a client configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,

        /// Directory for generated tests
        #[arg(long)]
        artifact_dir: Option<PathBuf>,

        /// Do not open generated tests automatically
        #[arg(long)]
        no_open: bool,
    },

    /// Create a test from randomly selected questions
    Random {
        #[command(flatten)]
        criteria: CriteriaFlags,

        /// Number of questions
        #[arg(short = 'n', long)]
        count: Option<u32>,

        /// Total point budget
        #[arg(short = 'p', long)]
        max_points: Option<u32>,

        /// Test name
        #[arg(long)]
        name: Option<String>,

        /// Test description
        #[arg(long)]
        description: Option<String>,

        /// Make the test active right away
        #[arg(long)]
        active: bool,
    },

    /// Search the bank and create a test from hand-picked questions
    Manual {
        #[command(flatten)]
        criteria: CriteriaFlags,

        /// Highest point value of a listed question
        #[arg(long)]
        question_max_points: Option<u32>,

        /// Question to include, as ID or ID:ORDER (repeatable)
        #[arg(short = 'q', long = "question")]
        questions: Vec<String>,

        /// Test name
        #[arg(long)]
        name: Option<String>,

        /// Test description
        #[arg(long)]
        description: Option<String>,

        /// Make the test active right away
        #[arg(long)]
        active: bool,
    },

    /// Change an existing test
    Modify {
        /// Test to modify
        test_id: i64,

        /// New test name
        #[arg(long)]
        name: Option<String>,

        /// New test description
        #[arg(long)]
        description: Option<String>,

        /// Set whether the test is active
        #[arg(long)]
        active: Option<bool>,

        /// Question to add, as ID or ID:ORDER (repeatable)
        #[arg(long)]
        add: Vec<String>,

        /// Question to remove (repeatable)
        #[arg(long)]
        remove: Vec<i64>,

        /// New position, as ID:ORDER (repeatable)
        #[arg(long)]
        order: Vec<String>,

        #[command(flatten)]
        criteria: CriteriaFlags,

        /// Highest point value of a question found for --add
        #[arg(long)]
        question_max_points: Option<u32>,
    },

    /// Manage tester attempt records
    Records {
        #[command(subcommand)]
        cmd: RecordsCommands,
    },

    /// Manage questions
    Question {
        #[command(subcommand)]
        cmd: QuestionCommands,
    },
}

#[derive(Subcommand)]
enum RecordsCommands {
    /// Record an attempt for a tester of a test
    Add {
        #[arg(long)]
        test_id: i64,

        #[arg(long)]
        tester_id: String,

        /// Attempt date, YYYY-MM-DDTHH:MM
        #[arg(long)]
        date: String,

        /// Score (left out when not graded)
        #[arg(long)]
        score: Option<String>,

        /// The tester passed
        #[arg(long)]
        passed: bool,
    },

    /// Link a new or existing tester to a test with a first attempt
    AddTester {
        #[arg(long)]
        test_id: i64,

        /// Name of a new tester
        #[arg(long, conflicts_with = "tester_id")]
        name: Option<String>,

        /// Id of an existing tester
        #[arg(long)]
        tester_id: Option<String>,

        /// Attempt date, YYYY-MM-DDTHH:MM
        #[arg(long)]
        date: String,

        #[arg(long)]
        score: Option<String>,

        #[arg(long)]
        passed: bool,
    },

    /// Change the score of an attempt
    Score {
        #[arg(long)]
        score_id: String,

        #[arg(long)]
        tester_id: String,

        #[arg(long)]
        test_id: i64,

        /// New score
        grade: String,
    },

    /// Change the date of an attempt
    Date {
        #[arg(long)]
        score_id: String,

        #[arg(long)]
        tester_id: String,

        #[arg(long)]
        test_id: i64,

        /// New date, YYYY-MM-DDTHH:MM
        date: String,
    },

    /// Change the pass/fail status of an attempt
    Status {
        #[arg(long)]
        score_id: String,

        #[arg(long)]
        tester_id: String,

        #[arg(long)]
        test_id: i64,

        /// Mark as passed (failed when left out)
        #[arg(long)]
        passed: bool,
    },

    /// Show a tester's attempts on a test
    History {
        #[arg(long)]
        tester_id: String,

        #[arg(long)]
        test_id: i64,
    },
}

#[derive(Subcommand)]
enum QuestionCommands {
    /// Submit a new question
    Add {
        /// Learning objective id
        #[arg(long)]
        obj_id: String,

        /// Short description shown in search results
        #[arg(long)]
        description: String,

        /// HTML file with the question text
        #[arg(long)]
        text: PathBuf,

        /// HTML file with the answer
        #[arg(long)]
        answer: PathBuf,

        #[arg(long = "type")]
        question_type: String,

        #[arg(long)]
        difficulty: String,

        #[arg(long)]
        max_points: u32,

        #[arg(long)]
        explanation: Option<String>,

        #[arg(long)]
        points_definition: Option<String>,

        #[arg(long)]
        source: Option<String>,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "testbank=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config
    let mut config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };
    if let Some(server) = &cli.server {
        config.server_url = server.clone();
    }

    let result = match cli.command {
        Commands::Init {
            force,
            artifact_dir,
            no_open,
        } => {
            let options = InitOptions {
                force,
                server: cli.server,
                artifact_dir,
                no_open,
                yes: cli.yes,
            };
            execute_init(options, &cli.config)
        }

        Commands::Random {
            criteria,
            count,
            max_points,
            name,
            description,
            active,
        } => {
            let options = RandomOptions {
                criteria: criteria.into(),
                count,
                max_points,
                name,
                description,
                active,
                yes: cli.yes,
            };
            execute_random(options, &config).await
        }

        Commands::Manual {
            criteria,
            question_max_points,
            questions,
            name,
            description,
            active,
        } => {
            let options = ManualOptions {
                criteria: criteria.into(),
                question_max_points,
                questions,
                name,
                description,
                active,
                yes: cli.yes,
            };
            execute_manual(options, &config).await
        }

        Commands::Modify {
            test_id,
            name,
            description,
            active,
            add,
            remove,
            order,
            criteria,
            question_max_points,
        } => {
            let options = ModifyOptions {
                test_id,
                name,
                description,
                active,
                add,
                remove,
                order,
                criteria: criteria.into(),
                question_max_points,
                yes: cli.yes,
            };
            execute_modify(options, &config).await
        }

        Commands::Records { cmd } => {
            let subcommand = match cmd {
                RecordsCommands::Add {
                    test_id,
                    tester_id,
                    date,
                    score,
                    passed,
                } => RecordsSubcommand::Add {
                    test_id,
                    tester_id,
                    date,
                    score,
                    passed,
                },
                RecordsCommands::AddTester {
                    test_id,
                    name,
                    tester_id,
                    date,
                    score,
                    passed,
                } => RecordsSubcommand::AddTester {
                    test_id,
                    name,
                    tester_id,
                    date,
                    score,
                    passed,
                },
                RecordsCommands::Score {
                    score_id,
                    tester_id,
                    test_id,
                    grade,
                } => RecordsSubcommand::Score {
                    score_id,
                    tester_id,
                    test_id,
                    grade,
                },
                RecordsCommands::Date {
                    score_id,
                    tester_id,
                    test_id,
                    date,
                } => RecordsSubcommand::Date {
                    score_id,
                    tester_id,
                    test_id,
                    date,
                },
                RecordsCommands::Status {
                    score_id,
                    tester_id,
                    test_id,
                    passed,
                } => RecordsSubcommand::Status {
                    score_id,
                    tester_id,
                    test_id,
                    passed,
                },
                RecordsCommands::History { tester_id, test_id } => {
                    RecordsSubcommand::History { tester_id, test_id }
                }
            };
            execute_records(subcommand, &config).await
        }

        Commands::Question { cmd } => match cmd {
            QuestionCommands::Add {
                obj_id,
                description,
                text,
                answer,
                question_type,
                difficulty,
                max_points,
                explanation,
                points_definition,
                source,
            } => {
                let options = QuestionOptions {
                    obj_id,
                    description,
                    text_file: text,
                    answer_file: answer,
                    question_type,
                    difficulty,
                    explanation,
                    points_definition,
                    max_points,
                    source,
                };
                execute_question(options, &config).await
            }
        },
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("✗").red(), e);
        std::process::exit(1);
    }
    Ok(())
}
