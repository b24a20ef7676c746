use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use wg_engine::{
    DriverHandle, EffectDispatcher, EffectError, EngineConfig, HapticSink, ReviewChannel,
    ReviewResponse, StoryDriver, StoryEvent, StorySession, TokioClock,
};
use wg_settings::JsonFileSettings;
use wg_story::StoryGraph;

/// Delay between characters when typing out node text.
const TYPE_DELAY: Duration = Duration::from_millis(12);

pub fn run(
    story: &Path,
    settings: &Path,
    config: Option<&Path>,
    hold_ms: Option<i64>,
    instant: bool,
) -> Result<(), String> {
    let graph = super::load_story(story)?;
    let mut engine_config = match config {
        Some(path) => EngineConfig::from_path(path).map_err(|e| e.to_string())?,
        None => EngineConfig::default(),
    };
    if let Some(ms) = hold_ms {
        engine_config = engine_config.with_hold_duration_ms(ms);
    }
    let store = JsonFileSettings::open(settings).map_err(|e| e.to_string())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| e.to_string())?;
    runtime.block_on(play(Arc::new(graph), Arc::new(store), engine_config, instant))
}

/// Rings the terminal bell when a hold starts.
struct TerminalBell;

impl HapticSink for TerminalBell {
    fn begin(&mut self, intensity: u8) -> Result<(), EffectError> {
        tracing::debug!(intensity, "haptic begin");
        let mut err = std::io::stderr();
        err.write_all(b"\x07")
            .and_then(|()| err.flush())
            .map_err(|e| EffectError::Failed(e.to_string()))
    }

    fn stop(&mut self) -> Result<(), EffectError> {
        tracing::debug!("haptic stop");
        Ok(())
    }
}

/// The terminal has no store page; a request is only logged.
struct ConsoleReview;

impl ReviewChannel for ConsoleReview {
    fn is_available(&self) -> bool {
        true
    }

    fn request_review(&mut self) -> Result<(), EffectError> {
        tracing::info!("review flow requested");
        Ok(())
    }
}

#[derive(PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// What the terminal knows about the running session.
struct Screen {
    graph: Arc<StoryGraph>,
    hold_ms: i64,
    instant: bool,
    /// The current node's choices are shown and input is accepted.
    ready: bool,
    holding: Option<usize>,
    stdin_open: bool,
    review_pending: bool,
    node: String,
}

impl Screen {
    async fn on_event(&mut self, event: StoryEvent, handle: &DriverHandle) -> Result<Flow, String> {
        match event {
            StoryEvent::NodeChanged { node, .. } => {
                self.ready = false;
                self.holding = None;
                let shown = self.graph.resolve(&node);
                println!();
                type_out(&shown.text, self.instant).await;
                self.node = node.clone();
                handle.reveal_finished(node).map_err(|e| e.to_string())?;
            }
            StoryEvent::ChoicesRevealed { node } if node == self.node => {
                self.print_choices();
                self.ready = true;
            }
            StoryEvent::HoldStarted { choice, .. } => {
                println!(
                    "  Holding \"{}\" for {:.1}s. Type 'release' to let go.",
                    self.choice_label(choice),
                    self.hold_ms as f64 / 1000.0
                );
            }
            StoryEvent::HoldCancelled { choice } => {
                if self.holding == Some(choice) {
                    self.holding = None;
                }
                println!("  Released \"{}\".", self.choice_label(choice));
            }
            StoryEvent::ChoiceCommitted { choice, from, .. } => {
                self.ready = false;
                self.holding = None;
                let label = self
                    .graph
                    .resolve(&from)
                    .choice(choice)
                    .map(|c| c.label.clone())
                    .unwrap_or_default();
                println!("  {} {label}", "→".bold());
            }
            StoryEvent::ReviewPromptRequested { message } => {
                self.review_pending = true;
                println!();
                println!("  {}", message.cyan());
                println!("  Type 'rate' or 'later'.");
            }
            StoryEvent::ReviewRequested => {
                println!("  {}", "Thank you for rating!".green());
            }
            StoryEvent::CommandRejected { reason } => {
                self.holding = None;
                println!("  {}", reason.yellow());
            }
            StoryEvent::ChoicesRevealed { .. }
            | StoryEvent::HapticBegin { .. }
            | StoryEvent::HapticStop { .. } => {}
        }
        Ok(Flow::Continue)
    }

    fn on_input(&mut self, line: &str, handle: &DriverHandle) -> Result<Flow, String> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or("");
        let arg = words.next();
        let send = |r: wg_engine::EngineResult<()>| r.map_err(|e| e.to_string());

        match command {
            "" => {}
            "quit" | "q" => return Ok(Flow::Quit),
            "help" | "?" => print_help(),
            "restart" => send(handle.restart())?,
            "rate" | "later" if self.review_pending => {
                self.review_pending = false;
                let response = if command == "rate" {
                    ReviewResponse::RateNow
                } else {
                    ReviewResponse::Later
                };
                send(handle.respond_to_review(response))?;
            }
            "release" | "r" => match arg.and_then(parse_choice).or(self.holding) {
                Some(choice) => send(handle.release(choice))?,
                None => println!("  {}", "Nothing is being held.".yellow()),
            },
            "hold" | "h" => match arg.and_then(parse_choice) {
                Some(choice) => {
                    self.holding = Some(choice);
                    send(handle.start_hold(choice))?;
                }
                None => println!("  {}", "Usage: hold <number>".yellow()),
            },
            other => match parse_choice(other) {
                Some(choice) => {
                    self.holding = Some(choice);
                    send(handle.start_hold(choice))?;
                }
                None => println!("  {} (type 'help')", "Unknown command.".yellow()),
            },
        }
        Ok(Flow::Continue)
    }

    fn print_choices(&self) {
        let node = self.graph.resolve(&self.node);
        println!();
        if node.is_ending() {
            println!("  {}", "The End.".bold());
            println!("  Type 'restart' to begin again or 'quit' to leave.");
            return;
        }
        for (i, choice) in node.choices.iter().enumerate() {
            println!("  [{}] {}", i + 1, choice.label);
        }
    }

    fn choice_label(&self, choice: usize) -> String {
        self.graph
            .resolve(&self.node)
            .choice(choice)
            .map(|c| c.label.clone())
            .unwrap_or_else(|| format!("choice {}", choice + 1))
    }

    /// Input is exhausted and nothing is left in flight.
    fn finished(&self) -> bool {
        !self.stdin_open && self.ready && self.holding.is_none()
    }
}

async fn play(
    graph: Arc<StoryGraph>,
    store: Arc<JsonFileSettings>,
    config: EngineConfig,
    instant: bool,
) -> Result<(), String> {
    if let Some(title) = graph.title() {
        println!("  {}", title.bold());
    }

    let hold_ms = config.hold_duration_ms;
    let session = StorySession::with_config(graph.clone(), store, config)
        .map_err(|e| e.to_string())?
        .with_review_channel(Box::new(ConsoleReview));
    let (handle, mut events) = StoryDriver::spawn(
        session,
        Arc::new(TokioClock::new()),
        EffectDispatcher::new(Box::new(TerminalBell)),
    );

    let mut screen = Screen {
        graph,
        hold_ms,
        instant,
        ready: false,
        holding: None,
        stdin_open: true,
        review_pending: false,
        node: String::new(),
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let flow = tokio::select! {
            event = events.recv() => match event {
                Some(event) => screen.on_event(event, &handle).await?,
                None => Flow::Quit,
            },
            line = lines.next_line(), if screen.ready && screen.stdin_open => {
                match line.map_err(|e| e.to_string())? {
                    Some(line) => screen.on_input(line.trim(), &handle)?,
                    None => {
                        screen.stdin_open = false;
                        Flow::Continue
                    }
                }
            }
        };
        if flow == Flow::Quit || screen.finished() {
            break;
        }
    }

    // The driver may already be gone; nothing to report then.
    let _ = handle.shutdown();
    println!();
    println!("  Farewell.");
    Ok(())
}

/// Parse a 1-based choice number into an index.
fn parse_choice(text: &str) -> Option<usize> {
    text.parse::<usize>().ok()?.checked_sub(1)
}

async fn type_out(text: &str, instant: bool) {
    if instant {
        println!("{text}");
        return;
    }
    let mut out = std::io::stdout();
    for ch in text.chars() {
        print!("{ch}");
        let _ = out.flush();
        tokio::time::sleep(TYPE_DELAY).await;
    }
    println!();
}

fn print_help() {
    println!("  Commands:");
    println!("    hold <n>    start holding choice n (or just type n)");
    println!("    release     let go of the held choice");
    println!("    restart     return to the start");
    println!("    rate/later  answer a rating prompt");
    println!("    quit        leave the story");
}
