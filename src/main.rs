use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jobskills::analysis::SegmentMode;
use jobskills::config::parse_label_list;
use jobskills::models::{ExperienceSkillIndex, JobPosting};
use jobskills::report::{self, ReportFormat};
use jobskills::search::SearchParams;
use jobskills::{
    corpus, Config, ExtractionPipeline, HuggingFaceClient, PipelineConfig, SerpApiClient, Storage,
};

#[derive(Parser, Debug)]
#[command(name = "jobskills")]
#[command(version = "0.1.0")]
#[command(about = "Map years of experience to the skills job postings ask for")]
struct Args {
    /// Database path for stored postings and results
    #[arg(long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search job postings and store them
    Fetch {
        /// Search query
        #[arg(short, long)]
        query: String,

        /// Location to search in
        #[arg(short, long, default_value = "United States")]
        location: String,

        /// Maximum number of postings to fetch
        #[arg(long, default_value = "10")]
        max_results: u32,

        /// Print a short preview of every posting
        #[arg(long)]
        preview: bool,
    },

    /// Extract skills per years of experience from stored postings
    Analyze {
        /// Read postings from a JSON file instead of the database
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Only analyze the first N stored postings
        #[arg(long)]
        limit: Option<u32>,

        /// Output format (text, csv, json)
        #[arg(short, long, default_value = "text")]
        format: ReportFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Summarize each chunk before entity extraction
        #[arg(long)]
        summarize: bool,

        /// Chunking strategy (word, fixed)
        #[arg(long, default_value = "word")]
        segment_mode: SegmentMode,

        /// Maximum characters per chunk
        #[arg(long)]
        max_chunk_length: Option<usize>,

        /// Comma separated entity labels treated as skills
        #[arg(long)]
        skill_labels: Option<String>,

        /// Stop after this many seconds and report what was collected
        #[arg(long)]
        run_timeout: Option<u64>,

        /// Print the last stored result instead of running the models
        #[arg(long)]
        cached: bool,
    },

    /// List stored postings
    Jobs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("jobskills=info".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?;
    let database = args.database.clone().unwrap_or_else(|| config.database_path.clone());
    let mut storage = Storage::new(&database)?;

    match args.command {
        Command::Fetch {
            query,
            location,
            max_results,
            preview,
        } => {
            let client = SerpApiClient::new(config.require_serp_api_key()?)?;
            let params = SearchParams {
                query,
                location: Some(location).filter(|l| !l.is_empty()),
                max_results,
            };

            let jobs = client.search_jobs(&params).await?;
            if jobs.is_empty() {
                tracing::warn!("No jobs found");
                return Ok(());
            }
            if preview {
                print!("{}", format_preview(&jobs));
            }
            storage.save_jobs(&jobs)?;
        }

        Command::Analyze {
            input,
            limit,
            format,
            output,
            summarize,
            segment_mode,
            max_chunk_length,
            skill_labels,
            run_timeout,
            cached,
        } => {
            if cached {
                match storage.get_index()? {
                    Some(index) => {
                        tracing::info!("Using stored result");
                        return output_index(&index, format, output.as_ref());
                    }
                    None => tracing::info!("No stored result found, running extraction"),
                }
            }

            let mut documents = match &input {
                Some(path) => corpus::load_documents_from_file(path).await?,
                None => storage.load_documents(limit)?,
            };
            if let Some(limit) = limit {
                documents.truncate(limit as usize);
            }

            let mut pipeline_config = PipelineConfig::from(&config);
            pipeline_config.segment_mode = segment_mode;
            pipeline_config.use_summarization |= summarize;
            pipeline_config.run_timeout = run_timeout.map(Duration::from_secs);
            if let Some(max) = max_chunk_length {
                pipeline_config.max_chunk_length = max;
            }
            if let Some(labels) = skill_labels.as_deref().map(parse_label_list) {
                if !labels.is_empty() {
                    pipeline_config.skill_label_allowlist = labels;
                }
            }

            let client = Arc::new(HuggingFaceClient::new(
                &config.inference_api_url,
                config.inference_api_token.as_deref(),
                &config.ner_model,
                &config.summarization_model,
            )?);

            let pipeline = ExtractionPipeline::new(client.clone(), pipeline_config)
                .with_summarizer(client);

            tracing::info!("Analyzing {} posting(s)", documents.len());
            let run = pipeline.run(documents).await;
            if run.timed_out {
                tracing::warn!("Run stopped early, results are partial");
            }

            storage.save_index(&run.index)?;
            output_index(&run.index, format, output.as_ref())?;
        }

        Command::Jobs => {
            println!("{} posting(s) in {}", storage.count_jobs()?, database);
            let jobs = storage.list_jobs()?;
            for job in jobs {
                println!(
                    "{}  {} at {} ({})",
                    job.job_id,
                    job.title.as_deref().unwrap_or("(untitled)"),
                    job.company.as_deref().unwrap_or("(unknown company)"),
                    job.location.as_deref().unwrap_or("-"),
                );
            }
        }
    }

    Ok(())
}

fn output_index(
    index: &ExperienceSkillIndex,
    format: ReportFormat,
    output: Option<&PathBuf>,
) -> anyhow::Result<()> {
    if let Some(path) = output {
        report::write_report(index, format, path)?;
    } else {
        print!("{}", report::render(index, format)?);
    }

    Ok(())
}

fn format_preview(jobs: &[JobPosting]) -> String {
    let mut output = String::new();

    for (i, job) in jobs.iter().enumerate() {
        output.push_str(&format!(
            "{}. {} at {}\n",
            i + 1,
            job.display_title(),
            job.display_company()
        ));
        output.push_str(&format!(
            "Location: {}\n",
            job.location.as_deref().unwrap_or("-")
        ));
        let snippet: String = job.description.chars().take(300).collect();
        output.push_str(&format!("Snippet: {}...\n\n", snippet));
        output.push_str(&"-".repeat(80));
        output.push('\n');
    }

    output
}
