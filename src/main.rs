use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use skyshow::config::{self, Command, Options, timing};
use skyshow::show::source;
use skyshow::{Canvas, Scheduler, ShowEvent};
use std::env;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{error, info};

fn init_logging(options: &Options) -> std::io::Result<()> {
    let Some(path) = &options.log_file else {
        return Ok(());
    };

    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(options.log_level)
        .init();
    Ok(())
}

fn restore_terminal() {
    let mut stdout = stdout();
    let _ = execute!(stdout, Clear(ClearType::All), Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

/// A panic mid-show must not leave the terminal in raw mode.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        eprintln!("{}", config::FATAL_MESSAGE);
        default_hook(info);
    }));
}

fn run_show(options: &Options, events: Vec<ShowEvent>, notice: Option<String>) -> std::io::Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

    let (cols, rows) = terminal::size()?;
    let mut canvas = Canvas::new(options.width, options.height, cols as usize, rows as usize * 2, options.bg_color);
    canvas.set_notice(notice);

    let mut scheduler = Scheduler::new(events, canvas.size());
    let mut rng = fastrand::Rng::new();

    let clock = Instant::now();
    let frame_interval = Duration::from_secs_f64(1.0 / options.fps as f64);
    let mut next_frame = clock;

    loop {
        let wait = next_frame
            .saturating_duration_since(Instant::now())
            .max(Duration::from_millis(timing::EVENT_POLL_MS));

        if event::poll(wait)? {
            match event::read()? {
                Event::Key(key_event) if key_event.kind != KeyEventKind::Release => {
                    if key_event.code == KeyCode::Char('q')
                        || key_event.code == KeyCode::Esc
                        || (key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(event::KeyModifiers::CONTROL))
                    {
                        break;
                    }
                    if key_event.code == KeyCode::Char('r') {
                        info!("show restarted from keyboard");
                        scheduler.reset();
                    }
                }
                Event::Resize(cols, rows) => {
                    canvas.resize(cols as usize, rows as usize * 2);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        if now < next_frame {
            continue;
        }
        next_frame += frame_interval;
        if next_frame < now {
            next_frame = now + frame_interval;
        }

        let timestamp = now.duration_since(clock).as_secs_f64() * 1000.0;
        scheduler.tick(timestamp, &mut canvas, &mut rng);
        canvas.present(&mut stdout)?;
    }

    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    Ok(())
}

fn main() -> std::io::Result<()> {
    let options = match config::parse_args(env::args().skip(1)) {
        Ok(Command::Run(options)) => options,
        Ok(Command::Help) => {
            eprintln!("{}", config::usage());
            return Ok(());
        }
        Err(message) => {
            eprintln!("{message}");
            eprintln!();
            eprintln!("{}", config::usage());
            std::process::exit(1);
        }
    };

    init_logging(&options)?;

    // Read the show before the terminal switches to raw mode (it may be stdin)
    let (events, notice) = source::load_or_empty(&options.show);

    install_panic_hook();

    if let Err(err) = run_show(&options, events, notice) {
        error!(error = %err, "show aborted");
        restore_terminal();
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "{}", config::FATAL_MESSAGE);
        let _ = writeln!(stderr, "{err}");
        std::process::exit(1);
    }

    Ok(())
}
