use {
    arboard::{Clipboard, ImageData},
    crossterm::{
        cursor,
        event::{
            self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
            KeyModifiers, MouseEventKind,
        },
        execute,
        terminal::{self},
    },
    flipbook::{
        autoplay::AutoplayState,
        config::Settings,
        flip::{FlipFrame, TurnAnimator},
        layout::{CELL_PIXEL_HEIGHT, CELL_PIXEL_WIDTH, Viewport},
        library::Document,
        spread::LayoutMode,
        viewer::Viewer,
    },
    image::DynamicImage,
    miette::IntoDiagnostic,
    ratatui::{
        Frame, Terminal,
        backend::CrosstermBackend,
        layout::{Alignment, Rect},
        style::{Color, Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Clear, Paragraph, Wrap},
    },
    ratatui_image::{StatefulImage, picker::Picker, protocol::StatefulProtocol},
    std::{
        io, panic,
        time::{Duration, Instant},
    },
};

use super::{compose::SpreadComposer, fullscreen::Fullscreen};

const NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        );
        let _ = terminal::disable_raw_mode();
    }
}

enum UiMode {
    Normal,
    GoToSpread { input: String },
}

pub struct TuiApp {
    viewer: Viewer<TurnAnimator>,
    composer: SpreadComposer,
    picker: Picker,
    /// The composed book image's protocol state for ratatui-image.
    current_image: Option<StatefulProtocol>,
    fullscreen: Fullscreen,
    notification: Option<String>,
    notification_time: Option<Instant>,
    show_help: bool,
    mode: UiMode,
}

impl TuiApp {
    pub fn new(
        document: Document,
        settings: &Settings,
        forced_mode: Option<LayoutMode>,
        prerender: bool,
        picker: Picker,
    ) -> Self {
        let (cols, rows) = terminal::size().unwrap_or((80, 24));
        let mut viewer = Viewer::new(
            document,
            Viewport::from_cells(cols, rows),
            settings.autoplay_interval(),
        );
        if let Some(mode) = forced_mode {
            viewer.set_layout_mode(mode);
        }
        viewer.attach_engine(TurnAnimator::new(settings.flip_duration()));

        let mut composer = SpreadComposer::new(settings.scaling_filter);
        if prerender {
            composer.prerender(viewer.document().pages());
        }

        let mut app = Self {
            viewer,
            composer,
            picker,
            current_image: None,
            fullscreen: Fullscreen::detect(),
            notification: None,
            notification_time: None,
            show_help: false,
            mode: UiMode::Normal,
        };
        app.refresh_image(Instant::now());
        app
    }

    pub fn run(&mut self) -> miette::Result<()> {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let _ = execute!(
                io::stdout(),
                DisableMouseCapture,
                terminal::LeaveAlternateScreen,
                cursor::Show
            );
            let _ = terminal::disable_raw_mode();
            original_hook(info);
        }));

        terminal::enable_raw_mode().into_diagnostic()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )
        .into_diagnostic()?;

        let _guard = TerminalGuard;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).into_diagnostic()?;

        let result = self.main_loop(&mut terminal);

        // Teardown order matters: the timer is cancelled and fullscreen
        // released before the terminal state is restored.
        self.viewer.stop_autoplay();
        self.fullscreen.leave();

        drop(_guard);
        let _ = panic::take_hook();

        result
    }

    fn main_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> miette::Result<()> {
        loop {
            let now = Instant::now();

            if let Some(t) = self.notification_time
                && t.elapsed() >= NOTIFICATION_DURATION
            {
                self.notification = None;
                self.notification_time = None;
            }

            if self.viewer.pump(now) {
                self.refresh_image(now);
            }
            if matches!(self.viewer.frame(now), FlipFrame::Turning { .. }) {
                // Recompose every tick while a turn is in flight.
                self.refresh_image(now);
            }

            terminal.draw(|f| self.render_ui(f)).into_diagnostic()?;

            if event::poll(self.poll_timeout(now)).into_diagnostic()? {
                match event::read().into_diagnostic()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => {
                        if !self.handle_key(key) {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    Event::Resize(cols, rows) => {
                        self.viewer.set_viewport(Viewport::from_cells(cols, rows));
                        self.refresh_image(Instant::now());
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// The loop sleeps until the nearest of: the autoplay deadline,
    /// the flip landing, an animation frame, or an idle tick.
    fn poll_timeout(&self, now: Instant) -> Duration {
        let mut timeout = Duration::from_millis(250);
        if matches!(self.viewer.frame(now), FlipFrame::Turning { .. }) {
            timeout = Duration::from_millis(33);
        }
        if let Some(deadline) = self.viewer.poll_deadline(now) {
            timeout = timeout.min(deadline);
        }
        timeout.max(Duration::from_millis(1))
    }

    fn book_pixel_size(&self) -> (u32, u32) {
        let geometry = self.viewer.geometry();
        let scale = self.viewer.scale();
        (
            (geometry.width * scale).round().max(2.0) as u32,
            (geometry.height * scale).round().max(2.0) as u32,
        )
    }

    fn refresh_image(&mut self, now: Instant) {
        if self.viewer.is_empty() {
            self.current_image = None;
            return;
        }

        let (width, height) = self.book_pixel_size();
        let frame = self.viewer.frame(now);
        match self
            .composer
            .compose_frame(self.viewer.spreads(), frame, width, height)
        {
            Some(img) => {
                self.current_image = Some(
                    self.picker
                        .new_resize_protocol(DynamicImage::ImageRgba8(img)),
                );
            }
            None => self.current_image = None,
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.notification = Some(message.into());
        self.notification_time = Some(Instant::now());
    }

    fn handle_mouse(&mut self, mouse: crossterm::event::MouseEvent) {
        let now = Instant::now();
        match mouse.kind {
            MouseEventKind::ScrollDown => self.viewer.next(now),
            MouseEventKind::ScrollUp => self.viewer.prev(now),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let now = Instant::now();
        self.notification = None;
        self.notification_time = None;

        if let UiMode::GoToSpread { ref mut input } = self.mode {
            match key.code {
                KeyCode::Esc => {
                    self.mode = UiMode::Normal;
                }
                KeyCode::Enter => {
                    let target = input.parse::<usize>().ok();
                    self.mode = UiMode::Normal;
                    let count = self.viewer.spread_count();
                    match target {
                        Some(n) if n >= 1 && n <= count => {
                            self.viewer.jump_to(n - 1, now);
                        }
                        Some(_) if count > 0 => {
                            self.notify(format!("Spread must be between 1 and {count}"));
                        }
                        _ => {}
                    }
                }
                KeyCode::Char(c) if c.is_ascii_digit() => input.push(c),
                KeyCode::Backspace => {
                    input.pop();
                }
                _ => {}
            }
            return true;
        }

        if self.show_help {
            self.show_help = false;
            return true;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return false;
            }

            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => self.viewer.next(now),
            KeyCode::Left | KeyCode::Char('h') => self.viewer.prev(now),

            KeyCode::Home | KeyCode::Char('g') => self.viewer.jump_to(0, now),
            KeyCode::End | KeyCode::Char('G') => {
                let last = self.viewer.spread_count().saturating_sub(1);
                self.viewer.jump_to(last, now);
            }

            KeyCode::Char('d') => {
                let mode = self.viewer.toggle_layout_mode();
                self.notify(format!("{} page layout", mode.label()));
                self.refresh_image(now);
            }

            KeyCode::Char('+') | KeyCode::Char('=') => {
                if self.viewer.zoom_in() {
                    self.notify(format!("Zoom {:.0}%", self.viewer.scale() * 100.0));
                    self.refresh_image(now);
                } else {
                    self.notify("Zoom is at its maximum");
                }
            }

            KeyCode::Char('-') | KeyCode::Char('_') => {
                if self.viewer.zoom_out() {
                    self.notify(format!("Zoom {:.0}%", self.viewer.scale() * 100.0));
                    self.refresh_image(now);
                } else {
                    self.notify("Zoom is at its minimum");
                }
            }

            KeyCode::Char('0') => {
                self.viewer.reset_zoom();
                self.notify("Zoom reset");
                self.refresh_image(now);
            }

            KeyCode::Char('s') => match self.viewer.toggle_autoplay(now) {
                AutoplayState::Running => {
                    let secs = self.viewer.autoplay().interval().as_secs_f32();
                    self.notify(format!("Autoplay started ({secs:.1}s) -- [s] stops"));
                }
                AutoplayState::Stopped => self.notify("Autoplay stopped"),
            },

            KeyCode::Char('f') => {
                self.fullscreen.toggle();
                if !self.fullscreen.is_supported() {
                    log::debug!("fullscreen not supported by this terminal");
                }
            }

            KeyCode::Char('y') => self.copy_spread_to_clipboard(),

            KeyCode::Char(':') => {
                self.mode = UiMode::GoToSpread {
                    input: String::new(),
                };
            }

            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
            }

            _ => {}
        }

        true
    }

    fn copy_spread_to_clipboard(&mut self) {
        let (width, height) = self.book_pixel_size();
        let frame = FlipFrame::Resting {
            spread: self.viewer.current_spread(),
        };
        let Some(img) = self
            .composer
            .compose_frame(self.viewer.spreads(), frame, width, height)
        else {
            self.notify("Nothing to copy");
            return;
        };

        let (w, h) = img.dimensions();
        let data = ImageData {
            width: w as usize,
            height: h as usize,
            bytes: img.into_raw().into(),
        };
        match Clipboard::new().and_then(|mut clipboard| clipboard.set_image(data)) {
            Ok(()) => self.notify("Spread copied to clipboard"),
            Err(e) => self.notify(format!("Failed to copy: {e}")),
        }
    }

    fn render_ui(&mut self, frame: &mut Frame) {
        let area = frame.area();

        if self.viewer.is_empty() {
            self.render_placeholder(frame, area);
            if self.show_help {
                self.render_help_overlay(frame);
            }
            return;
        }

        let chrome = !self.fullscreen.is_active();
        let mut content = area;
        if chrome {
            content.height = content.height.saturating_sub(1);
        }

        let title_rows = if chrome && !self.viewer.title().is_empty() {
            (self.viewer.title_band_height() / CELL_PIXEL_HEIGHT).ceil() as u16
        } else {
            0
        };
        if title_rows > 0 && content.height > title_rows {
            let title_area = Rect {
                height: title_rows,
                ..content
            };
            self.render_title(frame, title_area);
            content.y += title_rows;
            content.height -= title_rows;
        }

        let book_area = self.book_area(content);
        if let Some(ref mut protocol) = self.current_image {
            frame.render_stateful_widget(StatefulImage::default(), book_area, protocol);
        }

        if chrome {
            self.render_status_bar(frame, area);
        }
        if self.viewer.autoplay().is_running() {
            self.render_autoplay_indicator(frame);
        }
        if let Some(ref msg) = self.notification {
            self.render_notification(frame, area, msg);
        }
        if self.show_help {
            self.render_help_overlay(frame);
        }
        if let UiMode::GoToSpread { ref input } = self.mode {
            self.render_goto_dialog(frame, input);
        }
    }

    /// Centers the book inside the content area at its pixel geometry,
    /// converted to cells.
    fn book_area(&self, content: Rect) -> Rect {
        let (px_w, px_h) = self.book_pixel_size();
        let cols = ((px_w as f32 / CELL_PIXEL_WIDTH).ceil() as u16).clamp(1, content.width.max(1));
        let rows =
            ((px_h as f32 / CELL_PIXEL_HEIGHT).ceil() as u16).clamp(1, content.height.max(1));
        Rect {
            x: content.x + content.width.saturating_sub(cols) / 2,
            y: content.y + content.height.saturating_sub(rows) / 2,
            width: cols,
            height: rows,
        }
    }

    fn render_title(&self, frame: &mut Frame, area: Rect) {
        let title = Paragraph::new(Line::from(Span::styled(
            self.viewer.title().to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center);
        frame.render_widget(title, area);
    }

    fn render_placeholder(&self, frame: &mut Frame, area: Rect) {
        let popup_width = 48.min(area.width.saturating_sub(2));
        let popup_area = Rect {
            x: area.width.saturating_sub(popup_width) / 2,
            y: area.height.saturating_sub(5) / 2,
            width: popup_width,
            height: 5.min(area.height),
        };

        let lines = vec![
            Line::from("No content"),
            Line::from(Span::styled(
                format!("No pages found for \"{}\"", self.viewer.document().id()),
                Style::default().fg(Color::DarkGray),
            )),
            Line::from("Press [q] to quit"),
        ];
        let placeholder = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Gray)),
            )
            .wrap(Wrap { trim: false });
        frame.render_widget(placeholder, popup_area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status_area = Rect {
            x: area.x,
            y: area.y + area.height.saturating_sub(1),
            width: area.width,
            height: 1,
        };

        let autoplay_hint = if self.viewer.autoplay().is_running() {
            " | AUTOPLAY"
        } else {
            ""
        };
        let status_text = format!(
            " {} | {} | Zoom {:.0}%{} | [:] GoTo | [?] Help | [q] Quit",
            self.viewer.page_label(),
            self.viewer.mode().label(),
            self.viewer.scale() * 100.0,
            autoplay_hint,
        );
        let status_bar = Paragraph::new(Line::from(Span::styled(
            status_text,
            Style::default().fg(Color::Gray),
        )));
        frame.render_widget(status_bar, status_area);
    }

    fn render_notification(&self, frame: &mut Frame, area: Rect, message: &str) {
        let notification_area = Rect {
            x: area.x + area.width / 4,
            y: area.y + area.height / 2,
            width: area.width / 2,
            height: 3,
        };

        let notification = Paragraph::new(message)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Yellow)),
            )
            .style(Style::default().fg(Color::White))
            .alignment(Alignment::Center);
        frame.render_widget(Clear, notification_area);
        frame.render_widget(notification, notification_area);
    }

    fn render_autoplay_indicator(&self, frame: &mut Frame) {
        let area = frame.area();
        let indicator_width = 22.min(area.width);
        let indicator_area = Rect {
            x: area.width.saturating_sub(indicator_width).saturating_sub(1),
            y: 0,
            width: indicator_width,
            height: 3,
        };

        frame.render_widget(Clear, indicator_area);

        let secs = self.viewer.autoplay().interval().as_secs_f32();
        let widget = Paragraph::new(format!("Autoplay ({secs:.1}s)"))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .style(Style::default().fg(Color::Green)),
            )
            .style(Style::default().fg(Color::White));
        frame.render_widget(widget, indicator_area);
    }

    fn render_goto_dialog(&self, frame: &mut Frame, input: &str) {
        let area = frame.area();
        let popup_width = 40.min(area.width.saturating_sub(4));
        let popup_height = 5;
        let popup_area = Rect {
            x: area.width.saturating_sub(popup_width) / 2,
            y: area.height.saturating_sub(popup_height) / 2,
            width: popup_width,
            height: popup_height,
        };

        frame.render_widget(Clear, popup_area);

        let display_text = format!("Spread (1-{}): {}_", self.viewer.spread_count(), input);
        let dialog = Paragraph::new(display_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Go to Spread ")
                    .title_alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Cyan)),
            )
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: false });
        frame.render_widget(dialog, popup_area);
    }

    fn render_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup_width = 58.min(area.width.saturating_sub(4));
        let popup_height = 26.min(area.height.saturating_sub(2));
        let popup_area = Rect {
            x: area.width.saturating_sub(popup_width) / 2,
            y: area.height.saturating_sub(popup_height) / 2,
            width: popup_width,
            height: popup_height,
        };

        frame.render_widget(Clear, popup_area);

        let lines = vec![
            Line::from(Span::styled(
                "Navigation",
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(Color::Cyan),
            )),
            Line::from("  h, Left          Previous spread"),
            Line::from("  l, Right, Space  Next spread"),
            Line::from("  g, Home          First spread"),
            Line::from("  G, End           Last spread"),
            Line::from("  :                Go to spread (type number)"),
            Line::from("  Scroll wheel     Previous/next spread"),
            Line::from(""),
            Line::from(Span::styled(
                "Layout & Zoom",
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(Color::Yellow),
            )),
            Line::from("  d                Toggle single/double pages"),
            Line::from("  +, =             Zoom in"),
            Line::from("  -, _             Zoom out"),
            Line::from("  0                Reset zoom"),
            Line::from(""),
            Line::from(Span::styled(
                "Playback & Display",
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(Color::Magenta),
            )),
            Line::from("  s                Start/stop autoplay"),
            Line::from("  f                Toggle fullscreen"),
            Line::from("  y                Copy spread to clipboard"),
            Line::from(""),
            Line::from(Span::styled(
                "Other",
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(Color::Gray),
            )),
            Line::from("  ?                Toggle this help"),
            Line::from("  q, Esc, Ctrl-c   Quit"),
        ];

        let help = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Keyboard Controls ")
                    .title_alignment(Alignment::Center)
                    .style(Style::default().fg(Color::Cyan)),
            )
            .style(Style::default().fg(Color::White))
            .wrap(Wrap { trim: false });
        frame.render_widget(help, popup_area);
    }
}
