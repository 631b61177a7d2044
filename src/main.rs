use std::io;
use std::time::Duration;

use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

mod ai;
mod app;
mod config;
mod db;
mod error;
mod models;
mod services;
mod tui;
mod workflow;

use app::App;
use config::Config;
use error::Result;
use models::SummaryFormat;
use tui::{draw, handle_key_event};
use workflow::WorkflowState;

enum Command {
    Tui,
    Summarize { url: String, format: Option<SummaryFormat> },
    History { term: String },
    Delete { id: String },
    Login { email: String },
    Logout,
}

fn parse_args(args: &[String]) -> std::result::Result<Command, String> {
    let Some(flag) = args.get(1) else {
        return Ok(Command::Tui);
    };

    match flag.as_str() {
        "--summarize" => {
            let url = args.get(2).ok_or("--summarize needs a URL")?.clone();
            let format = match (args.get(3).map(String::as_str), args.get(4)) {
                (Some("--format"), Some(name)) => Some(name.parse()?),
                (Some(other), _) => return Err(format!("unexpected argument '{other}'")),
                (None, _) => None,
            };
            Ok(Command::Summarize { url, format })
        }
        "--history" => Ok(Command::History {
            term: args.get(2).cloned().unwrap_or_default(),
        }),
        "--delete" => Ok(Command::Delete {
            id: args.get(2).ok_or("--delete needs an id")?.clone(),
        }),
        "--login" => Ok(Command::Login {
            email: args.get(2).ok_or("--login needs an email")?.clone(),
        }),
        "--logout" => Ok(Command::Logout),
        other => Err(format!("unknown option '{other}'")),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!(
                "Usage: yt-summarizer [--summarize <url> [--format key-topics|detailed|abstract]] \
                 [--history [term]] [--delete <id>] [--login <email>] [--logout]"
            );
            std::process::exit(2);
        }
    };

    let config = Config::load()?;
    let mut app = App::new(&config).await?;

    match command {
        Command::Tui => {}
        Command::Summarize { url, format } => {
            let format = format.unwrap_or(config.default_format);
            match app.workflow.submit(&url, format).await {
                WorkflowState::Success(result) => {
                    println!("{}\n{}\n\n{}", result.video_title, result.format, result.summary);
                    return Ok(());
                }
                WorkflowState::Error(message) => {
                    eprintln!("{message}");
                    std::process::exit(1);
                }
                _ => return Ok(()),
            }
        }
        Command::History { term } => {
            for item in app.history.search(&term) {
                println!("{}  {}  [{}]", item.id, item.video_title, item.format);
            }
            return Ok(());
        }
        Command::Delete { id } => {
            app.history.delete(&id).await;
            println!("Deleted {id}");
            return Ok(());
        }
        Command::Login { email } => {
            let user = app.session.login(&email).await?;
            println!("Logged in as {}", user.email);
            return Ok(());
        }
        Command::Logout => {
            app.session.logout().await?;
            println!("Logged out");
            return Ok(());
        }
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        // Advance spinner animation
        app.tick_spinner();

        // Poll for a finished summary request
        app.poll_summary_result().await;

        // Pick up history changes from any request
        app.poll_history();

        // Poll for events with timeout to allow async operations
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = handle_key_event(
                        key,
                        app.input_active(),
                        app.confirm_active(),
                        app.show_help,
                    ) {
                        let should_quit = app.handle_action(action).await?;
                        if should_quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
