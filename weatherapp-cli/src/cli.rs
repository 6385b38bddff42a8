use std::io::{self, Write};

use anyhow::Context;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Password, Text};
use weatherapp_core::{Config, FAILED_TO_LOAD, QueryController, WeatherApiClient, WeatherClient};

use crate::render::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherapp", version, about = "Current weather for any location")]
pub struct Cli {
    /// Override the WeatherAPI.com base URL.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the WeatherAPI.com API key.
    Configure,

    /// Show current weather for a location.
    Show {
        /// City or location name.
        city: String,
    },

    /// Search interactively until Esc or Ctrl-C.
    Search,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { city } => {
                let controller = build_controller(self.base_url)?;
                show(&controller, &city, &mut io::stdout()).await
            }
            Command::Search => {
                let controller = build_controller(self.base_url)?;
                search(&controller).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(api_key)?;

    let path = config.save()?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

fn build_controller(base_url: Option<String>) -> anyhow::Result<QueryController<WeatherApiClient>> {
    let config = Config::load()?.with_env_overrides();
    let api_key = config.api_key()?.to_string();
    let base_url = base_url.unwrap_or_else(|| config.base_url().to_string());

    tracing::debug!(%base_url, "using weather endpoint");
    Ok(QueryController::new(WeatherApiClient::with_base_url(base_url), api_key))
}

/// Run one lookup and write every state observed until it settles.
///
/// Also stops when the lookup task ends without settling the state.
async fn show<C: WeatherClient + 'static>(
    controller: &QueryController<C>,
    city: &str,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut subscription = controller.subscribe();
    let finished = controller.fetch(city.trim()).join();
    tokio::pin!(finished);

    loop {
        tokio::select! {
            biased;

            state = subscription.changed() => {
                let Some(state) = state else { break };
                writeln!(out, "{}", render(&state))?;
                if state.is_terminal() {
                    break;
                }
            }
            written = &mut finished => {
                if !written && !controller.state().is_terminal() {
                    writeln!(out, "{FAILED_TO_LOAD}")?;
                }
                break;
            }
        }
    }

    controller.unsubscribe(subscription);
    Ok(())
}

/// Run a blocking prompt off the async workers. `None` on Esc or Ctrl-C.
async fn read_location<F>(prompt: F) -> anyhow::Result<Option<String>>
where
    F: FnOnce() -> Result<String, InquireError> + Send + 'static,
{
    let answer = tokio::task::spawn_blocking(prompt).await.context("Prompt task failed")?;

    match answer {
        Ok(city) => Ok(Some(city)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(err) => Err(err).context("Failed to read location"),
    }
}

async fn search(controller: &QueryController<WeatherApiClient>) -> anyhow::Result<()> {
    while let Some(city) =
        read_location(|| Text::new("Search for any location").prompt()).await?
    {
        show(controller, &city, &mut io::stdout()).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use weatherapp_core::{ClientError, WeatherRecord};

    #[derive(Debug)]
    struct RejectingClient;

    #[async_trait]
    impl WeatherClient for RejectingClient {
        async fn fetch(&self, _api_key: &str, _city: &str) -> Result<WeatherRecord, ClientError> {
            Err(ClientError::Server { status: 400, body: String::new() })
        }
    }

    #[derive(Debug)]
    struct PanickingClient;

    #[async_trait]
    impl WeatherClient for PanickingClient {
        async fn fetch(&self, _api_key: &str, _city: &str) -> Result<WeatherRecord, ClientError> {
            panic!("client blew up")
        }
    }

    async fn show_output<C: WeatherClient + 'static>(client: C) -> String {
        let controller = QueryController::new(client, "KEY");
        let mut out = Vec::new();
        tokio::time::timeout(Duration::from_secs(5), show(&controller, "  Lima ", &mut out))
            .await
            .expect("show should return")
            .expect("writing to a Vec cannot fail");
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn show_prints_until_error_state() {
        let text = show_output(RejectingClient).await;
        assert!(text.contains("Loading..."));
        assert!(text.trim_end().ends_with(FAILED_TO_LOAD));
    }

    #[tokio::test]
    async fn show_returns_when_lookup_task_panics() {
        let text = show_output(PanickingClient).await;
        assert!(text.trim_end().ends_with(FAILED_TO_LOAD));
    }

    #[tokio::test]
    async fn read_location_returns_answer() {
        let city = read_location(|| Ok("Oslo".to_string())).await.unwrap();
        assert_eq!(city.as_deref(), Some("Oslo"));
    }

    #[tokio::test]
    async fn read_location_stops_on_cancel_or_interrupt() {
        assert!(read_location(|| Err(InquireError::OperationCanceled)).await.unwrap().is_none());
        assert!(read_location(|| Err(InquireError::OperationInterrupted)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_location_propagates_other_prompt_errors() {
        assert!(read_location(|| Err(InquireError::NotTTY)).await.is_err());
    }

    #[test]
    fn parses_show_with_city() {
        let cli = Cli::try_parse_from(["weatherapp", "show", "New York"]).unwrap();
        match cli.command {
            Command::Show { city } => assert_eq!(city, "New York"),
            other => panic!("unexpected command {other:?}"),
        }
        assert!(cli.base_url.is_none());
    }

    #[test]
    fn base_url_is_global() {
        let cli =
            Cli::try_parse_from(["weatherapp", "search", "--base-url", "http://localhost:9000"])
                .unwrap();
        assert!(matches!(cli.command, Command::Search));
        assert_eq!(cli.base_url.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn show_requires_city() {
        assert!(Cli::try_parse_from(["weatherapp", "show"]).is_err());
    }
}
