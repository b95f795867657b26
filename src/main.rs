//! Terminal front end: one prompt in, one block per provider out.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{debug, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use wrapper_ai::config::AppConfig;
use wrapper_ai::error::Error;
use wrapper_ai::history::PromptHistory;
use wrapper_ai::request::{
  clamp_max_tokens, clamp_temperature, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};
use wrapper_ai::{Coordinator, QueryRequest, ResultSet, WrapperBackend};

/// Send one prompt to every configured LLM and compare the answers.
#[derive(Parser, Debug)]
#[command(name = "wrapper-ai", version, about)]
struct Cli
{   /// Prompt to send
    prompt: Option<String>
  , /// Sampling temperature, clamped to 0.0..=1.0
    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32
  , /// Response length cap, clamped to 100..=2000
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: usize
  , /// Reuse the Nth most recent prompt from history
    #[arg(long, value_name = "N", conflicts_with = "prompt")]
    from_history: Option<usize>
  , /// Print stored prompts and exit
    #[arg(long)]
    list_history: bool
  , /// After answering, accept `r <n>` to regenerate provider n
    #[arg(long, short)]
    interactive: bool
  , /// Prompt history file
    #[arg(long, value_name = "PATH")]
    history_file: Option<PathBuf>
  , /// Append logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>
}

#[tokio::main]
async fn main() -> ExitCode
{   let cli = Cli::parse();
    match run(cli).await
    {   Ok(()) => ExitCode::SUCCESS
      , Err(e) => {
          eprintln!("{}", e);
          ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Error>
{   let mut config = AppConfig::from_env()?;
    if let Some(path) = cli.history_file
    {   config.history_file = path;
    }
    if let Some(path) = cli.log_file
    {   config.log_file = Some(path);
    }
    init_logging(config.log_file.as_deref())?;

    let history = PromptHistory::new(&config.history_file);
    if cli.list_history
    {   for (i, prompt) in history.recent()?.iter().enumerate()
        {   println!("{:>2}. {}", i + 1, prompt);
        }
        return Ok(());
    }

    let prompt = match (cli.prompt, cli.from_history)
    {   (Some(prompt), _) => prompt
      , (None, Some(n)) => pick_from_history(&history, n)?
      , (None, None) => {
          return Err(Error::InvalidRequest(
            "please enter a prompt before generating responses".to_string()
          ));
        }
    };

    let request = QueryRequest::new(
      prompt
    , clamp_temperature(cli.temperature)
    , clamp_max_tokens(cli.max_tokens)
    )?;
    if let Err(e) = history.save(request.prompt())
    {   warn!("{}", e);
    }

    let backend = WrapperBackend::new(Coordinator::from_config(&config)?);

    println!("Querying all models... ⏳");
    let mut results
      = first_reply(backend.query_all(request.clone())?).await?;
    print!("{}", render(&results));

    if cli.interactive
    {   interact(&backend, &request, &mut results).await?;
    }

    backend.shutdown().await
}

/// Nth most recent prompt, 1-based. Read errors win over "not found".
fn pick_from_history(
  history: &PromptHistory
, n: usize
) -> Result<String, Error>
{   let recent = history.recent()?;
    n.checked_sub(1)
      .and_then(|i| recent.into_iter().nth(i))
      .ok_or_else(|| {
        Error::History(format!("no prompt #{} in history", n))
      })
}

/// Filter used when RUST_LOG is unset
fn default_log_filter(log_file: Option<&Path>) -> &'static str
{   // stderr shares the terminal with results, keep it quiet
    if log_file.is_some() { "info" } else { "warn" }
}

fn init_logging(log_file: Option<&Path>) -> Result<(), Error>
{   let mut builder = env_logger::Builder::from_env(
      env_logger::Env::default()
        .default_filter_or(default_log_filter(log_file))
    );
    if let Some(path) = log_file
    {   let file = OpenOptions::new()
          .create(true)
          .append(true)
          .open(path)
          .map_err(|e| {
            Error::InvalidConfiguration(
              format!("{}: {}", path.display(), e)
            )
          })?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init().map_err(|e| Error::Other(e.to_string()))
}

async fn first_reply<T>(
  mut reply_rx: mpsc::UnboundedReceiver<T>
) -> Result<T, Error>
{   reply_rx.recv().await.ok_or_else(|| {
      Error::Other("Backend dropped the reply".to_string())
    })
}

async fn interact(
  backend: &WrapperBackend
, request: &QueryRequest
, results: &mut ResultSet
) -> Result<(), Error>
{   let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop
    {   print!("\n[r <n>] regenerate, [q] quit > ");
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await
        {   Ok(Some(line)) => line
          , Ok(None) => break
          , Err(e) => return Err(Error::Other(e.to_string()))
        };
        let mut words = line.split_whitespace();
        match (words.next(), words.next())
        {   (None, _) => continue
          , (Some("q"), _) | (Some("quit"), _) => break
          , (Some("r"), Some(n)) => {
              let index = match n.parse::<usize>()
              {   Ok(n) if n >= 1 && n <= results.len() => n - 1
                , _ => {
                    eprintln!("pick a provider between 1 and {}", results.len());
                    continue;
                  }
              };
              println!("Regenerating {}... ⏳", backend.names()[index]);
              match first_reply(
                backend.regenerate(index, request.clone())?
              ).await?
              {   Ok((index, result)) => {
                    debug!("Merging regenerated result at {}", index);
                    results.replace(index, result)?;
                    print!("{}", render(results));
                  }
                , Err(e) => eprintln!("{}", e)
              }
            }
          , _ => eprintln!("unknown command: {}", line.trim())
        }
    }
    Ok(())
}

fn render(results: &ResultSet) -> String
{   let mut out = String::new();
    match results.average_elapsed_ms()
    {   Some(avg) => {
          out.push_str(&format!("⚡ Average response time: {:.2} ms\n", avg));
        }
      , None => {
          out.push_str("⚡ Average response time: no successful calls\n");
        }
    }
    out.push_str("\n### 🧾 Model Responses\n");
    for (i, result) in results.iter().enumerate()
    {   out.push_str(&format!(
          "\n[{}] {}\nTokens: {} | Time: {} ms\n{}\n",
          i + 1,
          result.model,
          result.tokens,
          result.time_ms,
          result.response
        ));
    }
    out
}
