use anyhow::{anyhow, Context, Result};
use clap::Parser;
use reqwest::Url;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::AsyncBufReadExt;
use tracing::{debug, info};

use tender_miniapp::api::{ApiClient, Backend};
use tender_miniapp::config;
use tender_miniapp::host::Host;
use tender_miniapp::nav::{App, ProfileForm};
use tender_miniapp::render::{Action, Document};
use tender_miniapp::state::{Phase, Screen, Tab};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,
}

/// Host shell for driving the engine from a terminal. Alerts go straight
/// to stdout; the readiness signals only matter to a real Telegram shell.
struct TerminalHost;

impl Host for TerminalHost {
    fn ready(&self) {
        debug!("host ready");
    }

    fn expand(&self) {
        debug!("host expand");
    }

    fn alert(&self, message: &str) {
        println!("⚠ {message}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;

    let base_url = Url::parse(&cfg.api.base_url).context("invalid api.base_url")?;
    let init_data = std::env::var("TELEGRAM_INIT_DATA")
        .ok()
        .or_else(|| cfg.telegram.init_data.clone())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| {
            anyhow!("no session identity: set telegram.init_data or TELEGRAM_INIT_DATA")
        })?;

    let mut app = App::new(ApiClient::new(base_url, init_data), TerminalHost);

    info!("starting mini app session");
    let doc = app.bootstrap().await;
    print_doc(&app, &doc);
    if matches!(app.phase(), Phase::Failed(_)) {
        return Ok(());
    }

    print_help();
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        let mut parts = line.split_whitespace();
        let doc = match parts.next() {
            None => continue,
            Some("home") => app.select_tab(Tab::Home).await,
            Some("tenders") => app.select_tab(Tab::Tenders).await,
            Some("applications") => app.select_tab(Tab::Applications).await,
            Some("profile") => app.select_tab(Tab::Profile).await,
            Some("open") => {
                let Some(id) = parts.next().and_then(|v| v.parse::<i64>().ok()) else {
                    println!("usage: open <id>");
                    continue;
                };
                match app.state().screen {
                    Screen::Applications => app.open_application(id).await,
                    _ => app.open_tender(id).await,
                }
            }
            Some("back") => app.back().await,
            Some("edit") => app.navigate(Screen::ProfileEdit).await,
            Some("apply") => app.apply().await,
            Some("save") => {
                let rest = line.strip_prefix("save").unwrap_or_default();
                app.submit_profile(parse_form(rest)).await
            }
            Some("refresh") => app.on_foreground().await,
            Some("quit") | Some("exit") => break,
            Some(other) => {
                println!("unknown command: {other}");
                continue;
            }
        };
        print_doc(&app, &doc);
    }

    Ok(())
}

/// Split `ФИО; город; телефон; навыки` into the profile form fields.
fn parse_form(rest: &str) -> ProfileForm {
    let mut fields = rest.splitn(4, ';').map(|s| s.trim().to_string());
    ProfileForm {
        full_name: fields.next().unwrap_or_default(),
        city: fields.next().unwrap_or_default(),
        phone: fields.next().unwrap_or_default(),
        skills_text: fields.next().unwrap_or_default(),
    }
}

fn tab_label(tab: Tab) -> &'static str {
    match tab {
        Tab::Home => "Главная",
        Tab::Tenders => "Заказы",
        Tab::Applications => "Отклики",
        Tab::Profile => "Профиль",
    }
}

fn action_hint(action: &Action) -> String {
    match action {
        Action::Go(Screen::ProfileEdit) => "edit".to_string(),
        Action::Go(screen) => screen.slug().to_string(),
        Action::OpenTender(id) | Action::OpenApplication(id) => format!("open {id}"),
        Action::Apply => "apply".to_string(),
        Action::SubmitProfile => "save <ФИО>; <город>; <телефон>; <навыки>".to_string(),
    }
}

fn print_doc<B: Backend, H: Host>(app: &App<B, H>, doc: &Document) {
    let back = if doc.back_visible { " [back]" } else { "" };
    println!("== {}{back} ==", doc.title);
    let tabs: Vec<String> = Tab::ALL
        .iter()
        .map(|tab| {
            if Some(*tab) == doc.active_tab {
                format!("[{}]", tab_label(*tab))
            } else {
                tab_label(*tab).to_string()
            }
        })
        .collect();
    println!("{}", tabs.join("  "));
    println!("{}", doc.body);
    if !doc.actions.is_empty() {
        let hints: Vec<String> = doc.actions.iter().map(action_hint).collect();
        println!("-- {}", hints.join(" | "));
    }
    debug!(screen = app.state().screen.slug(), "frame printed");
}

fn print_help() {
    println!("commands: home tenders applications profile | open <id> | back | edit | apply");
    println!("          save <ФИО>; <город>; <телефон>; <навыки> | refresh | quit");
}
