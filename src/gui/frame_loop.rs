use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};

use crate::gui::{
    canvas_surface::{pixel_size, CanvasSurface},
    error::VizGuiError,
};
use crate::reading_store::ReadingStore;
use crate::renderer::Surface;
use crate::scene::{Input, Scene};
use crate::seconds_passed;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

/// Pacing and reporting for [`run_frame_loop`].
#[derive(Debug, Clone, Copy)]
pub struct FrameLoopConfig {
    /// Target frames per second.
    pub fps: u32,
    /// How many frames pass between frame rate reports.
    pub report_every: u64,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            report_every: 300,
        }
    }
}

/// Maps a terminal event onto what the frame loop cares about. `q`, `Esc`
/// and `Ctrl-C` close, a resize reports the new size in pixels.
pub fn translate(event: Event) -> Option<Input> {
    match event {
        Event::Resize(cols, rows) => {
            let (width, height) = pixel_size(cols, rows);
            Some(Input::Resize(width, height))
        }
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Input::Close),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Input::Close)
            }
            _ => None,
        },
        _ => None,
    }
}

/// Takes over the terminal and animates the readings in `store` until the
/// user closes the view. The terminal is restored whether or not the loop
/// fails.
pub fn run_frame_loop(
    store: &ReadingStore,
    receiver_count: usize,
    config: FrameLoopConfig,
) -> Result<(), VizGuiError> {
    with_restore(
        || {
            enable_raw_mode()?;
            stdout().execute(EnterAlternateScreen).map(drop)
        },
        || {
            let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
            terminal.clear()?;
            drive(&mut terminal, store, receiver_count, config)
        },
        vec![
            Box::new(disable_raw_mode) as RestoreStep,
            Box::new(|| stdout().execute(LeaveAlternateScreen).map(drop)) as RestoreStep,
        ],
    )
}

type RestoreStep<'a> = Box<dyn FnOnce() -> io::Result<()> + 'a>;

/// Runs `body` once `enter` succeeds, then every step of `restore` no matter
/// which of them failed, `enter` included. The first error is returned.
fn with_restore<'a, T>(
    enter: impl FnOnce() -> io::Result<()>,
    body: impl FnOnce() -> Result<T, VizGuiError>,
    restore: Vec<RestoreStep<'a>>,
) -> Result<T, VizGuiError> {
    let res = enter().map_err(VizGuiError::from).and_then(|()| body());
    let restored = restore
        .into_iter()
        .fold(Ok(()), |acc: io::Result<()>, step| {
            let step_res = step();
            acc.and(step_res)
        });
    let value = res?;
    restored?;
    Ok(value)
}

fn drive<B: Backend>(
    terminal: &mut Terminal<B>,
    store: &ReadingStore,
    receiver_count: usize,
    config: FrameLoopConfig,
) -> Result<(), VizGuiError> {
    let area = terminal.size()?;
    let mut surface = CanvasSurface::new(pixel_size(area.width, area.height));
    let mut scene = Scene::new(receiver_count, surface.size(), &mut rand::thread_rng());

    let frame_time = Duration::from_secs(1) / config.fps.max(1);
    let report_every = config.report_every.max(1);
    let mut frames: u64 = 0;
    let mut window_start = Instant::now();

    loop {
        let frame_start = Instant::now();

        while event::poll(Duration::ZERO)? {
            match translate(event::read()?) {
                Some(Input::Close) => return Ok(()),
                Some(Input::Resize(width, height)) => {
                    surface.resize(width, height);
                    scene.resize(width, height);
                }
                None => {}
            }
        }

        scene.tick(&mut surface, store, seconds_passed());
        terminal.draw(|frame| frame.render_widget(surface.canvas(), frame.size()))?;

        frames += 1;
        if frames % report_every == 0 {
            let elapsed = window_start.elapsed().as_secs_f64();
            info!("fps: {:.2}", report_every as f64 / elapsed);
            window_start = Instant::now();
        }

        if let Some(rest) = frame_time.checked_sub(frame_start.elapsed()) {
            spin_sleep::sleep(rest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reading_store::Sample;
    use crate::record::DeviceId;
    use crossterm::event::KeyEvent;
    use ratatui::backend::TestBackend;
    use std::cell::Cell;

    #[test]
    fn test_translate() {
        assert_eq!(translate(Event::Resize(80, 24)), Some(Input::Resize(160, 96)));
        assert_eq!(
            translate(Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE))),
            Some(Input::Close)
        );
        assert_eq!(
            translate(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))),
            Some(Input::Close)
        );
        assert_eq!(
            translate(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE))),
            None
        );
        assert_eq!(translate(Event::FocusGained), None);
    }

    fn step<'a>(ran: &'a Cell<u32>, fail: bool) -> RestoreStep<'a> {
        Box::new(move || {
            ran.set(ran.get() + 1);
            if fail {
                Err(io::Error::new(io::ErrorKind::Other, "restore"))
            } else {
                Ok(())
            }
        })
    }

    #[test]
    fn test_restore_runs_when_entering_fails() {
        let ran = Cell::new(0);
        let body_ran = Cell::new(false);

        let res = with_restore(
            || Err(io::Error::new(io::ErrorKind::Other, "enter")),
            || {
                body_ran.set(true);
                Ok(())
            },
            vec![step(&ran, false), step(&ran, false)],
        );

        assert!(matches!(res, Err(VizGuiError::IOError(e)) if e.to_string() == "enter"));
        assert!(!body_ran.get());
        assert_eq!(ran.get(), 2);
    }

    #[test]
    fn test_every_restore_step_runs() {
        let ran = Cell::new(0);

        let res = with_restore(
            || Ok(()),
            || Err::<(), _>(io::Error::new(io::ErrorKind::Other, "body").into()),
            vec![step(&ran, true), step(&ran, false)],
        );
        assert!(matches!(res, Err(VizGuiError::IOError(e)) if e.to_string() == "body"));
        assert_eq!(ran.get(), 2);

        let res = with_restore(|| Ok(()), || Ok(5), vec![step(&ran, true), step(&ran, false)]);
        assert!(matches!(res, Err(VizGuiError::IOError(e)) if e.to_string() == "restore"));
        assert_eq!(ran.get(), 4);
    }

    #[test]
    fn test_scene_renders_through_terminal() {
        let store = ReadingStore::new();
        let dev = DeviceId::from_token(b"A1B2C3D4E5F6").unwrap();
        store.append(dev, 0, Sample { strength: -85, timestamp: 0.0 });

        let mut terminal = Terminal::new(TestBackend::new(30, 15)).unwrap();
        let area = terminal.size().unwrap();
        let mut surface = CanvasSurface::new(pixel_size(area.width, area.height));
        let mut scene = Scene::new(1, surface.size(), &mut rand::thread_rng());

        for _ in 0..2 {
            scene.tick(&mut surface, &store, seconds_passed());
            terminal
                .draw(|frame| frame.render_widget(surface.canvas(), frame.size()))
                .unwrap();
        }

        let buf = terminal.backend().buffer();
        assert!(buf
            .content()
            .iter()
            .any(|cell| cell.symbol() != " " && cell.symbol() != "\u{2800}"));
    }
}
