mod keymap;
mod theme;
mod ui;
mod wizard;

use std::io::{Stdout, stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use stowage_app::{App, TracingNotifier};
use stowage_core::machine::MachineOptions;
use stowage_core::mode::WizardMode;

use crate::ui::loading::SystemWizardLoader;
use crate::wizard::{FlowSignal, WizardFlow};

pub use wizard::WizardExit;

const TICK_RATE: Duration = Duration::from_millis(120);

pub(crate) struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    pub(crate) fn enter() -> Result<Self> {
        let terminal = enter_with_ops(
            || enable_raw_mode().context("failed to enable raw mode"),
            || {
                let mut out = stdout();
                execute!(out, EnterAlternateScreen, Hide)
                    .context("failed to enter alternate screen")
            },
            || {
                let backend = CrosstermBackend::new(stdout());
                Terminal::new(backend).context("failed to create terminal backend")
            },
            || {
                let mut out = stdout();
                execute!(out, Show, LeaveAlternateScreen)
                    .context("failed to restore terminal screen during rollback")
            },
            || disable_raw_mode().context("failed to disable raw mode during rollback"),
        )?;
        Ok(Self { terminal })
    }

    pub(crate) fn draw<F>(&mut self, draw_fn: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame<'_>),
    {
        self.terminal
            .draw(draw_fn)
            .context("failed to render terminal")?;
        Ok(())
    }

    pub(crate) fn autoresize(&mut self) -> Result<()> {
        self.terminal
            .autoresize()
            .context("failed to autoresize terminal")?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.terminal.backend_mut(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

fn enter_with_ops<T, EnableRawMode, EnterAltScreen, CreateTerminal, LeaveAltScreen, DisableRawMode>(
    mut enable_raw_mode_op: EnableRawMode,
    mut enter_alt_screen_op: EnterAltScreen,
    mut create_terminal_op: CreateTerminal,
    mut leave_alt_screen_op: LeaveAltScreen,
    mut disable_raw_mode_op: DisableRawMode,
) -> Result<T>
where
    EnableRawMode: FnMut() -> Result<()>,
    EnterAltScreen: FnMut() -> Result<()>,
    CreateTerminal: FnMut() -> Result<T>,
    LeaveAltScreen: FnMut() -> Result<()>,
    DisableRawMode: FnMut() -> Result<()>,
{
    enable_raw_mode_op()?;

    if let Err(error) = enter_alt_screen_op() {
        return Err(failure_with_rollback(
            error,
            false,
            &mut leave_alt_screen_op,
            &mut disable_raw_mode_op,
        ));
    }

    create_terminal_op().map_err(|error| {
        failure_with_rollback(error, true, &mut leave_alt_screen_op, &mut disable_raw_mode_op)
    })
}

fn failure_with_rollback<LeaveAltScreen, DisableRawMode>(
    setup_error: anyhow::Error,
    alt_screen_entered: bool,
    leave_alt_screen_op: &mut LeaveAltScreen,
    disable_raw_mode_op: &mut DisableRawMode,
) -> anyhow::Error
where
    LeaveAltScreen: FnMut() -> Result<()>,
    DisableRawMode: FnMut() -> Result<()>,
{
    let mut cleanup_failures = Vec::<String>::new();

    if alt_screen_entered && let Err(error) = leave_alt_screen_op() {
        cleanup_failures.push(format!("{error:#}"));
    }
    if let Err(error) = disable_raw_mode_op() {
        cleanup_failures.push(format!("{error:#}"));
    }

    if cleanup_failures.is_empty() {
        setup_error
    } else {
        anyhow!(
            "{setup_error:#}\nterminal rollback cleanup failed: {}",
            cleanup_failures.join("\n")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DrainReason {
    Timeout,
    AfterInput,
}

trait LoopTickTarget {
    fn on_tick(&mut self);
    fn has_pending_work(&self) -> bool;
}

impl LoopTickTarget for WizardFlow {
    fn on_tick(&mut self) {
        WizardFlow::on_tick(self);
    }

    fn has_pending_work(&self) -> bool {
        WizardFlow::has_pending_work(self)
    }
}

/// Ticks on every poll timeout, and right after input only while a fetch
/// or page load is outstanding.
fn drain_loader<T: LoopTickTarget>(target: &mut T, reason: DrainReason) -> bool {
    if reason == DrainReason::AfterInput && !target.has_pending_work() {
        return false;
    }
    target.on_tick();
    true
}

/// Runs one wizard in the alternate screen until it completes or is cancelled.
pub fn run_wizard(app: &App, mode: Option<WizardMode>, options: MachineOptions) -> Result<WizardExit> {
    let loader = Arc::new(SystemWizardLoader::new(app.clone()));
    let mut flow = WizardFlow::new(mode, options, loader, Box::new(TracingNotifier));
    let mut session = TerminalSession::enter()?;
    tracing::info!(mode = ?mode, "wizard started");

    loop {
        session.draw(|frame| flow.render(frame))?;

        let has_event = event::poll(TICK_RATE).context("failed to poll terminal event")?;
        if !has_event {
            drain_loader(&mut flow, DrainReason::Timeout);
            continue;
        }

        let key = match event::read().context("failed to read terminal event")? {
            Event::Resize(_, _) => {
                session.autoresize()?;
                continue;
            }
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press) => key,
            _ => continue,
        };

        if keymap::is_ctrl_c(key) {
            if let FlowSignal::Exit(exit) = flow.abort() {
                tracing::info!(exit = ?exit, "wizard interrupted");
                return Ok(exit);
            }
            continue;
        }

        if let FlowSignal::Exit(exit) = flow.on_key(key) {
            tracing::info!(exit = ?exit, "wizard finished");
            return Ok(exit);
        }

        drain_loader(&mut flow, DrainReason::AfterInput);
    }
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let pct_x = percent_x.min(100);
    let pct_y = percent_y.min(100);

    let [_, vertical, _] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ])
        .areas(area);
    let [_, horizontal, _] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ])
        .areas(vertical);
    horizontal
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::anyhow;
    use ratatui::layout::Rect;

    use super::{DrainReason, LoopTickTarget, centered_rect, drain_loader, enter_with_ops};

    struct TickProbe {
        ticks: usize,
        pending: bool,
    }

    impl LoopTickTarget for TickProbe {
        fn on_tick(&mut self) {
            self.ticks += 1;
        }

        fn has_pending_work(&self) -> bool {
            self.pending
        }
    }

    #[test]
    fn centered_rect_returns_middle_segment() {
        let area = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(80, 60, area);

        assert_eq!(centered.width, 80);
        assert_eq!(centered.height, 30);
        assert_eq!(centered.x, 10);
        assert_eq!(centered.y, 10);
    }

    #[test]
    fn centered_rect_clamps_percentages_over_100() {
        let area = Rect::new(3, 4, 40, 20);
        assert_eq!(centered_rect(120, 150, area), area);
    }

    #[test]
    fn timeout_always_ticks() {
        let mut probe = TickProbe {
            ticks: 0,
            pending: false,
        };
        assert!(drain_loader(&mut probe, DrainReason::Timeout));
        assert_eq!(probe.ticks, 1);
    }

    #[test]
    fn input_ticks_only_with_pending_work() {
        let mut idle = TickProbe {
            ticks: 0,
            pending: false,
        };
        assert!(!drain_loader(&mut idle, DrainReason::AfterInput));
        assert_eq!(idle.ticks, 0);

        let mut busy = TickProbe {
            ticks: 0,
            pending: true,
        };
        assert!(drain_loader(&mut busy, DrainReason::AfterInput));
        assert_eq!(busy.ticks, 1);
    }

    #[test]
    fn failed_alt_screen_rolls_back_raw_mode_only() {
        let calls = RefCell::new(Vec::<&str>::new());

        let result = enter_with_ops(
            || {
                calls.borrow_mut().push("raw-on");
                Ok(())
            },
            || {
                calls.borrow_mut().push("alt-on");
                Err(anyhow!("alt screen unavailable"))
            },
            || -> anyhow::Result<()> {
                calls.borrow_mut().push("terminal");
                Ok(())
            },
            || {
                calls.borrow_mut().push("alt-off");
                Ok(())
            },
            || {
                calls.borrow_mut().push("raw-off");
                Ok(())
            },
        );

        let error = result.expect_err("setup should fail");
        assert_eq!(error.to_string(), "alt screen unavailable");
        assert_eq!(*calls.borrow(), vec!["raw-on", "alt-on", "raw-off"]);
    }

    #[test]
    fn failed_terminal_creation_reports_cleanup_failures() {
        let calls = RefCell::new(Vec::<&str>::new());

        let result = enter_with_ops(
            || {
                calls.borrow_mut().push("raw-on");
                Ok(())
            },
            || {
                calls.borrow_mut().push("alt-on");
                Ok(())
            },
            || -> anyhow::Result<()> { Err(anyhow!("no tty")) },
            || {
                calls.borrow_mut().push("alt-off");
                Err(anyhow!("leave failed"))
            },
            || {
                calls.borrow_mut().push("raw-off");
                Ok(())
            },
        );

        let message = format!("{:#}", result.expect_err("setup should fail"));
        assert!(message.contains("no tty"));
        assert!(message.contains("terminal rollback cleanup failed: leave failed"));
        assert_eq!(*calls.borrow(), vec!["raw-on", "alt-on", "alt-off", "raw-off"]);
    }

    #[test]
    fn successful_setup_skips_rollback() {
        let calls = RefCell::new(Vec::<&str>::new());

        let value = enter_with_ops(
            || {
                calls.borrow_mut().push("raw-on");
                Ok(())
            },
            || {
                calls.borrow_mut().push("alt-on");
                Ok(())
            },
            || Ok(7),
            || {
                calls.borrow_mut().push("alt-off");
                Ok(())
            },
            || {
                calls.borrow_mut().push("raw-off");
                Ok(())
            },
        )
        .expect("setup succeeds");

        assert_eq!(value, 7);
        assert_eq!(*calls.borrow(), vec!["raw-on", "alt-on"]);
    }
}
