use std::io;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use flashdeck_service::HttpService;
use flashdeck_tui::app::App;
use ratatui::prelude::*;

/// Terminal flashcard study client.
#[derive(Debug, Parser)]
#[command(name = "flashdeck", version)]
struct Cli {
    /// Base URL of the flashcard store.
    #[arg(long, env = "FLASHDECK_SERVER_URL", default_value = "http://127.0.0.1:8000")]
    server: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !wait_for_server(&cli.server)? {
        eprintln!(
            "warning: flashcard store at {} is not responding; starting anyway",
            cli.server
        );
    }

    run_tui(HttpService::new(&cli.server))
}

/// Poll the health endpoint for up to 10s. `false` means the store never
/// answered; the UI still starts and reports the failed load itself.
fn wait_for_server(url: &str) -> Result<bool> {
    // Throwaway runtime; the App builds its own.
    let runtime = tokio::runtime::Runtime::new()?;
    let service = HttpService::new(url);
    let start = Instant::now();
    let timeout = Duration::from_secs(10);

    while start.elapsed() <= timeout {
        if runtime.block_on(service.health_check()).is_ok() {
            return Ok(true);
        }
        thread::sleep(Duration::from_millis(50));
    }
    Ok(false)
}

fn run_tui(service: HttpService) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, service);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    service: HttpService,
) -> Result<()> {
    let mut app = App::new(service)?;

    loop {
        terminal.draw(|frame| app.render(frame))?;

        // Generation blocks; the frame above shows the busy banner first.
        if app.generate_request.is_some() {
            app.process_generate_request();
            continue;
        }

        if let Event::Key(key) = event::read()? {
            // Ctrl+C always quits
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            // q quits unless we're in an input mode
            if key.code == KeyCode::Char('q') && !app.is_input_mode() {
                break;
            }
            app.handle_key(key);
        }
    }

    Ok(())
}
