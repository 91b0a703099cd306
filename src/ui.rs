use std::error::Error;
use std::io;
use std::time::Duration as StdDuration;

use chrono::{Datelike, NaiveDate};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use crossterm::{ExecutableCommand, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};

use temporal_picker::{CalendarDay, Key, Picker, SelectionMarks, SelectionMode};

const FOCUSED_PANEL_BORDER_COLOR: Color = Color::Yellow;
const INACTIVE_PANEL_BORDER_COLOR: Color = Color::DarkGray;
const HIGHLIGHT_BACKGROUND_COLOR: Color = Color::Rgb(42, 45, 52);
const MAX_YEAR_INPUT: usize = 8;

pub fn run_picker(picker: &mut Picker) -> Result<(), Box<dyn Error>> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, picker);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	picker: &mut Picker,
) -> Result<(), Box<dyn Error>> {
	let mut app = App::new(picker);

	loop {
		app.follow_picker(picker);
		terminal.draw(|frame| draw_picker(frame, &app, picker))?;

		if event::poll(StdDuration::from_millis(250))? {
			if let CEvent::Key(key) = event::read()? {
				if key.kind != KeyEventKind::Press {
					continue;
				}

				let should_quit = match app.mode {
					InputMode::Year => handle_year_key(&mut app, key.code, picker),
					InputMode::Normal => handle_normal_key(&mut app, key, picker),
				};

				if should_quit {
					break;
				}
			}
		}
	}

	Ok(())
}

fn draw_picker(frame: &mut Frame, app: &App, picker: &Picker) {
	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([
			Constraint::Min(10),
			Constraint::Length(3),
			Constraint::Length(4),
		])
		.split(frame.area());

	render_months(frame, layout[0], app, picker);
	render_input(frame, layout[1], app, picker);
	render_footer(frame, layout[2], app, picker);
}

fn render_months(frame: &mut Frame, area: Rect, app: &App, picker: &Picker) {
	let months = picker.config().visible_months();
	let weeks = picker.calendar().dates.weeks();
	let header = picker
		.days()
		.iter()
		.map(|day| format!("{:<3}", day.short.chars().take(2).collect::<String>()))
		.collect::<String>();

	let columns = Layout::default()
		.direction(Direction::Horizontal)
		.constraints((0..months).map(|_| Constraint::Ratio(1, months)).collect::<Vec<_>>())
		.split(area);

	for (offset, column) in columns.iter().enumerate() {
		let Some(window) = picker.window().shift_months(offset as i32) else {
			continue;
		};

		let mut lines = vec![Line::from(header.trim_end().to_string())];
		for week in &weeks {
			if !week.iter().any(|day| window.contains(day.date)) {
				continue;
			}
			let spans = week
				.iter()
				.map(|day| {
					if window.contains(day.date) {
						Span::styled(format!("{:>2} ", day.date.day()), day_style(day, app))
					} else {
						Span::raw("   ")
					}
				})
				.collect::<Vec<_>>();
			lines.push(Line::from(spans));
		}

		let block = Block::default()
			.borders(Borders::ALL)
			.title(window.first_day().format("%B %Y").to_string())
			.border_style(border_style(offset == 0 && app.focus == FocusPane::Grid));
		frame.render_widget(Paragraph::new(lines).block(block), *column);
	}
}

fn day_style(day: &CalendarDay, app: &App) -> Style {
	let mut style = Style::default();
	if day.is_weekend {
		style = style.fg(Color::Gray);
	}
	if day.is_today {
		style = style.fg(Color::LightGreen).add_modifier(Modifier::UNDERLINED);
	}

	match day.marks {
		SelectionMarks::Single { is_selected: true } => {
			style = style.fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD);
		}
		SelectionMarks::Range(marks) if marks.is_selected_range_start || marks.is_selected_range_end => {
			style = style.fg(Color::Black).bg(Color::Yellow).add_modifier(Modifier::BOLD);
		}
		SelectionMarks::Range(marks) if marks.is_selected_range => {
			style = style.fg(Color::Black).bg(Color::LightYellow);
		}
		SelectionMarks::Range(marks) if marks.is_previewed_range => {
			style = style.fg(Color::LightCyan).bg(HIGHLIGHT_BACKGROUND_COLOR);
		}
		_ => {}
	}

	if app.focus == FocusPane::Grid && day.date == app.cursor {
		style = style.add_modifier(Modifier::REVERSED);
	}
	style
}

fn render_input(frame: &mut Frame, area: Rect, app: &App, picker: &Picker) {
	let text = match app.mode {
		InputMode::Year => format!("year> {}", app.year_input),
		InputMode::Normal => {
			let value = picker.input_props().value;
			if value.is_empty() {
				"(no date)".to_string()
			} else {
				value
			}
		}
	};

	let block = Block::default()
		.borders(Borders::ALL)
		.title("Date")
		.border_style(border_style(app.focus == FocusPane::Input));
	frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App, picker: &Picker) {
	let help = match app.focus {
		FocusPane::Grid => "arrows/hjkl move | Enter/space pick | e end preview | t today | c clear",
		FocusPane::Input => "Up/Down day | Shift month | Shift+Alt year",
	};
	let value = picker
		.value()
		.map(ToString::to_string)
		.unwrap_or_else(|| "no selection".to_string());

	let lines = vec![
		Line::from(format!("Tab pane | n/N month | y/Y year | g go to year | q quit | {help}")),
		Line::from(format!("{} | {value}", app.status)),
	];
	let footer = Paragraph::new(lines).block(Block::default().borders(Borders::TOP));
	frame.render_widget(footer, area);
}

fn handle_normal_key(app: &mut App, key: KeyEvent, picker: &mut Picker) -> bool {
	match key.code {
		KeyCode::Char('q') | KeyCode::Esc => return true,
		KeyCode::Tab => app.focus = app.focus.next(),
		KeyCode::BackTab => app.focus = app.focus.prev(),
		KeyCode::Char('n') => picker.next_month(),
		KeyCode::Char('N') => picker.previous_month(),
		KeyCode::Char('y') => picker.next_year(),
		KeyCode::Char('Y') => picker.previous_year(),
		KeyCode::Char('t') => picker.jump_to_today(),
		KeyCode::Char('c') => {
			picker.clear_selected_range();
			app.status = "Cleared".to_string();
		}
		KeyCode::Char('g') => {
			app.mode = InputMode::Year;
			app.year_input.clear();
		}
		_ => match app.focus {
			FocusPane::Grid => handle_grid_key(app, key.code, picker),
			FocusPane::Input => handle_input_key(key, picker),
		},
	}
	false
}

fn handle_grid_key(app: &mut App, code: KeyCode, picker: &mut Picker) {
	let props = picker.date_props(app.cursor);
	let arrow = match code {
		KeyCode::Up | KeyCode::Char('k') => Some(Key::ArrowUp),
		KeyCode::Down | KeyCode::Char('j') => Some(Key::ArrowDown),
		KeyCode::Left | KeyCode::Char('h') => Some(Key::ArrowLeft),
		KeyCode::Right | KeyCode::Char('l') => Some(Key::ArrowRight),
		_ => None,
	};

	if let Some(arrow) = arrow {
		props.on_focus(picker);
		props.on_key_down(picker, arrow);
		return;
	}

	match code {
		KeyCode::Enter | KeyCode::Char(' ') => {
			props.on_click(picker);
			app.status = match picker.mode() {
				SelectionMode::Single => format!("Picked {}", props.key),
				SelectionMode::Range => format!("Range point {}", props.key),
			};
		}
		KeyCode::Char('e') => picker.calendar_props().on_mouse_leave(picker),
		_ => {}
	}
}

// Terminals report no key releases, so modifiers are pressed and released
// around each arrow.
fn handle_input_key(key: KeyEvent, picker: &mut Picker) {
	let arrow = match key.code {
		KeyCode::Up => Key::ArrowUp,
		KeyCode::Down => Key::ArrowDown,
		_ => return,
	};

	let input = picker.input_props();
	let mut held = Vec::new();
	if key.modifiers.contains(KeyModifiers::SHIFT) {
		held.push(Key::Shift);
	}
	if key.modifiers.contains(KeyModifiers::ALT) {
		held.push(Key::Alt);
	}

	for modifier in &held {
		input.on_key_down(picker, *modifier);
	}
	input.on_key_down(picker, arrow);
	input.on_key_up(picker, arrow);
	for modifier in held.iter().rev() {
		input.on_key_up(picker, *modifier);
	}
}

fn handle_year_key(app: &mut App, code: KeyCode, picker: &mut Picker) -> bool {
	match code {
		KeyCode::Esc => {
			app.mode = InputMode::Normal;
			app.status = "Cancelled".to_string();
		}
		KeyCode::Enter => {
			picker.set_year_str(&app.year_input);
			app.status = format!("Showing {}", picker.window().year());
			app.mode = InputMode::Normal;
		}
		KeyCode::Backspace => {
			app.year_input.pop();
		}
		KeyCode::Char(value) if app.year_input.len() < MAX_YEAR_INPUT => {
			app.year_input.push(value);
		}
		_ => {}
	}
	false
}

fn border_style(focused: bool) -> Style {
	if focused {
		Style::default()
			.fg(FOCUSED_PANEL_BORDER_COLOR)
			.add_modifier(Modifier::BOLD)
	} else {
		Style::default().fg(INACTIVE_PANEL_BORDER_COLOR)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusPane {
	Grid,
	Input,
}

impl FocusPane {
	fn next(self) -> Self {
		match self {
			FocusPane::Grid => FocusPane::Input,
			FocusPane::Input => FocusPane::Grid,
		}
	}

	fn prev(self) -> Self {
		self.next()
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
	Normal,
	Year,
}

#[derive(Debug, Clone)]
struct App {
	focus: FocusPane,
	cursor: NaiveDate,
	mode: InputMode,
	year_input: String,
	status: String,
}

impl App {
	fn new(picker: &Picker) -> Self {
		Self {
			focus: FocusPane::Grid,
			cursor: picker.focused_date().unwrap_or(picker.window().first_day()),
			mode: InputMode::Normal,
			year_input: String::new(),
			status: "Ready".to_string(),
		}
	}

	/// Moves the cursor to a requested focus target, or back into view after
	/// the window moved away from it.
	fn follow_picker(&mut self, picker: &mut Picker) {
		if let Some(date) = picker.take_focus_request() {
			self.cursor = date;
		}
		let months = i64::from(picker.config().visible_months());
		let offset = picker.window().month_offset(self.cursor);
		if !(0..months).contains(&offset) {
			self.cursor = picker.window().first_day();
		}
	}
}
