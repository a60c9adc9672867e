//! Interactive terminal UI. The sequencer serves commands on a worker
//! thread; keys reach it through the handle and the command channel, and
//! renderer events flow back over mpsc to the draw loop.

mod bridge;

use crate::{load_topology, TuiArgs};
use anyhow::{Context, Result};
use bridge::{apply_event, TuiListener, TuiRenderer, UiEvent};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style::Print};
use hopsim_engine::{Command, RttSampler, Sequencer, SequencerHandle};
use hopsim_model::Topology;
use hopsim_render::{render_frame, UiOpts, ViewState};
use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

pub fn run_tui(args: TuiArgs) -> Result<()> {
    let topology = load_topology(args.scenario.topology.as_deref())?;
    let config = args.scenario.to_config();
    let sampler = match args.scenario.seed {
        Some(seed) => RttSampler::seeded(seed),
        None => RttSampler::from_entropy(),
    };

    let handle = SequencerHandle::new();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (ui_tx, ui_rx) = mpsc::channel();

    let renderer = TuiRenderer::new(ui_tx.clone(), args.anim_ms);
    let listener = TuiListener::new(ui_tx);
    let mut sequencer =
        Sequencer::new(topology.clone(), config, renderer, listener, handle.clone())
            .sampler(sampler);
    let worker = thread::spawn(move || sequencer.serve(cmd_rx));

    terminal::enable_raw_mode().context("failed to enter raw mode")?;
    execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)
        .context("failed to enter alternate screen")?;

    let result = event_loop(&topology, &handle, &cmd_tx, &ui_rx);

    // Stop any in-flight run before waiting for the worker.
    handle.cancel();
    let _ = cmd_tx.send(Command::Shutdown);
    let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = worker.join();

    result
}

fn event_loop(
    topology: &Topology,
    handle: &SequencerHandle,
    commands: &Sender<Command>,
    ui_events: &Receiver<UiEvent>,
) -> Result<()> {
    let mut state = ViewState::new();
    let mut dirty = true;
    loop {
        while let Ok(event) = ui_events.try_recv() {
            apply_event(&mut state, event);
            dirty = true;
        }
        if dirty {
            draw(topology, &state)?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(50)).context("failed to poll input")? {
            if let CEvent::Key(key) = event::read().context("failed to read input")? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                    KeyCode::Char('s') => {
                        let _ = commands.send(Command::Start);
                    }
                    KeyCode::Char('p') => {
                        handle.pause_toggle();
                    }
                    KeyCode::Char('r') => {
                        handle.cancel();
                        let _ = commands.send(Command::Reset);
                    }
                    _ => {}
                }
            }
        }
    }
    Ok(())
}

fn draw(topology: &Topology, state: &ViewState) -> Result<()> {
    let (width, height) = terminal::size().context("failed to query terminal size")?;
    let frame = render_frame(topology, state, &UiOpts { plain: false }, width, height);
    let mut out = io::stdout();
    queue!(out, Clear(ClearType::All))?;
    for (row, line) in frame.lines().enumerate() {
        queue!(out, cursor::MoveTo(0, row as u16), Print(line))?;
    }
    out.flush().context("failed to flush frame")?;
    Ok(())
}
