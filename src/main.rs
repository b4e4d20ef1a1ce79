use clap::{Args, Parser, Subcommand, ValueEnum};
use anyhow::{Result, bail};
use tracing::{info, warn};

mod api;
mod app;
mod chat;
mod config;
mod form;
mod handler;
mod i18n;
mod logging;
mod request;
mod session;
mod tabs;
mod tui;
mod ui;

use api::ApiClient;
use app::App;
use config::Config;
use form::{FieldId, Fields};
use i18n::Language;
use session::Session;
use tui::{EventHandler, Tui};

#[derive(Parser)]
#[command(name = "labassist", version)]
#[command(about = "Terminal client for the MOF-LabAssist API (forward and inverse MOF lookup, chat)")]
struct Cli {
    /// Persist an API base URL override (used instead of the default)
    #[arg(long, global = true, value_name = "URL")]
    api: Option<String>,
    /// Forget a persisted API base URL override
    #[arg(long, global = true, conflicts_with = "api")]
    reset_api: bool,
    /// Interface and request language (persisted)
    #[arg(long, global = true, value_enum)]
    lang: Option<LangArg>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LangArg {
    En,
    Ar,
}

impl From<LangArg> for Language {
    fn from(arg: LangArg) -> Self {
        match arg {
            LangArg::En => Language::English,
            LangArg::Ar => Language::Arabic,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the backend answers its health probe
    Health,
    /// Send one chat message and print the reply
    Chat {
        /// Your question
        message: String,
    },
    /// Application → MOF candidates
    Forward(ForwardArgs),
    /// MOF → candidate applications
    Inverse {
        /// MOF name (defaults to UiO-66-NH2)
        #[arg(short, long)]
        name: Option<String>,
        /// URL of a CIF file for the material
        #[arg(long)]
        cif_url: Option<String>,
    },
}

#[derive(Args)]
struct ForwardArgs {
    /// Target application (defaults to CO2_capture)
    #[arg(short, long)]
    application: Option<String>,
    #[arg(long)]
    selectivity_min: Option<String>,
    /// Minimum uptake in mmol/g
    #[arg(long)]
    uptake_min: Option<String>,
    /// Temperature in kelvin
    #[arg(long)]
    t_k: Option<String>,
    /// Pressure in bar
    #[arg(long)]
    p_bar: Option<String>,
    /// Relative humidity in percent
    #[arg(long)]
    humidity: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so it logs to a file
    if cli.command.is_some() {
        logging::init_stderr();
    } else if let Err(e) = logging::init_file() {
        eprintln!("logging disabled: {}", e);
    }
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let store = Config::get_config_path()
        .map_err(|e| warn!(error = %e, "config unavailable, settings will not persist"))
        .ok();

    if cli.api.is_some() || cli.reset_api {
        let Some(path) = store.as_deref() else {
            bail!("cannot persist API override without a config directory");
        };
        let mut stored = Config::load_from(path)?;
        stored.api = cli.api.clone();
        stored.save_to(path)?;
        info!(api = ?stored.api, "API override updated");
    }

    let mut session = Session::restore(
        store,
        std::env::var("LABASSIST_API").ok(),
        config::current_host().as_deref(),
    );
    if let Some(lang) = cli.lang {
        session.set_language(lang.into());
    }

    match cli.command {
        Some(command) => run_command(&session, command).await,
        None => run_tui(session).await,
    }
}

async fn run_tui(session: Session) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let mut app = App::new(session);
    handler::start_health_check(&mut app, &events.sender());

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    let tx = events.sender();
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event, &tx)?,
            None => break,
        }
    }
    info!("exiting");
    Ok(())
}

async fn run_command(session: &Session, command: Commands) -> Result<()> {
    let api = ApiClient::new(session.api_base());
    let lang = session.language();
    let s = lang.strings();
    let failure_text = match command {
        Commands::Health => s.status_disconnected.to_string(),
        _ => format!("❌ {}", s.api_error),
    };

    let result = match command {
        Commands::Health => api.health().await.map(|_| s.status_connected.to_string()),
        Commands::Chat { message } => {
            let request = api::ChatRequest { message, lang };
            api.chat(&request).await.map(|reply| reply.text())
        }
        Commands::Forward(args) => {
            let mut fields = Fields::new(s);
            for (id, value) in [
                (FieldId::Application, args.application),
                (FieldId::SelectivityMin, args.selectivity_min),
                (FieldId::UptakeMin, args.uptake_min),
                (FieldId::TemperatureK, args.t_k),
                (FieldId::PressureBar, args.p_bar),
                (FieldId::Humidity, args.humidity),
            ] {
                fields.get_mut(id).value = value.unwrap_or_default();
            }
            api.forward(&fields.forward_request(lang)).await.map(|v| pretty(&v))
        }
        Commands::Inverse { name, cif_url } => {
            let mut fields = Fields::new(s);
            fields.get_mut(FieldId::MofName).value = name.unwrap_or_default();
            fields.get_mut(FieldId::CifUrl).value = cif_url.unwrap_or_default();
            api.inverse(&fields.inverse_request(lang)).await.map(|v| pretty(&v))
        }
    };

    match result {
        Ok(text) => {
            println!("{}", text);
            Ok(())
        }
        Err(e) => {
            println!("{}", failure_text);
            Err(e.into())
        }
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lang_flag_accepts_known_codes_only() {
        let cli = Cli::try_parse_from(["labassist", "--lang", "ar", "health"]).unwrap();
        assert_eq!(cli.lang.map(Language::from), Some(Language::Arabic));

        assert!(Cli::try_parse_from(["labassist", "--lang", "fr"]).is_err());
    }

    #[test]
    fn api_and_reset_conflict() {
        assert!(Cli::try_parse_from(["labassist", "--api", "http://x/api", "--reset-api"]).is_err());
    }
}
