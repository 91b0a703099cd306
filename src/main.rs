mod logging;
mod ui;

use std::error::Error;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use temporal_picker::calendar::{Clock, SystemClock};
use temporal_picker::{
	CalendarDay, DateRange, DynamicValue, Picker, PickerConfig, SelectionMarks, SelectionMode,
	TemporalValue, WeekStart, load_config,
};

use crate::ui::run_picker;

#[derive(Debug, Parser)]
#[command(name = "temporal-picker", about = "Terminal calendar date picker")]
struct Cli {
	#[arg(long)]
	config: Option<PathBuf>,
	/// Select a date range instead of a single date.
	#[arg(long)]
	range: bool,
	#[arg(long)]
	months: Option<u32>,
	/// First day of the week, 0 (Sunday) to 6 (Saturday).
	#[arg(long)]
	week_start: Option<u8>,
	/// Month to show first, as YYYY-MM.
	#[arg(long)]
	month: Option<String>,
	/// Initial value: a date, a range `start/end`, or a token such as LAST_MONTH.
	#[arg(long)]
	value: Option<String>,
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	Pick,
	Grid {
		#[arg(long)]
		json: bool,
	},
	Presets {
		#[arg(long)]
		json: bool,
	},
	Tables,
}

#[derive(Debug, Serialize)]
struct Preset {
	token: &'static str,
	name: &'static str,
	date: Option<NaiveDateTime>,
	range: Option<DateRange>,
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> Result<(), Box<dyn Error>> {
	let cli = Cli::parse();
	logging::init(cli.verbose);

	let config = build_config(&cli)?;

	match cli.command.unwrap_or(Command::Pick) {
		Command::Pick => {
			let mut picker = Picker::new(config);
			run_picker(&mut picker)?;
			print_selection(&picker)?;
		}
		Command::Grid { json } => {
			let picker = Picker::new(config);
			if json {
				let days = picker.calendar().dates.collect::<Vec<_>>();
				println!("{}", serde_json::to_string_pretty(&days)?);
			} else {
				print_grid(&picker);
			}
		}
		Command::Presets { json } => {
			print_presets(SystemClock.now(), json)?;
		}
		Command::Tables => {
			let picker = Picker::new(config);
			println!("{}", serde_json::to_string_pretty(&picker.tables())?);
		}
	}

	Ok(())
}

fn build_config(cli: &Cli) -> Result<PickerConfig, Box<dyn Error>> {
	let mut config = match &cli.config {
		Some(path) => load_config(path)?,
		None => PickerConfig::default(),
	};

	if cli.range {
		config = config.with_mode(SelectionMode::Range);
	}
	if let Some(months) = cli.months {
		config = config.with_months_visible(months);
	}
	if let Some(index) = cli.week_start {
		config = config.with_week_start(WeekStart::try_from(index)?);
	}
	if let Some(raw) = cli.month.as_deref() {
		config = config.with_calendar_month(parse_month(raw)?);
	}
	if let Some(raw) = cli.value.as_deref() {
		config = config.with_default_value(raw.parse::<TemporalValue>()?);
	}

	Ok(config)
}

fn parse_month(input: &str) -> Result<NaiveDate, Box<dyn Error>> {
	Ok(NaiveDate::parse_from_str(&format!("{}-01", input.trim()), "%Y-%m-%d")?)
}

fn print_selection(picker: &Picker) -> Result<(), Box<dyn Error>> {
	match picker.value() {
		Some(value) => println!("{value}"),
		None => println!("no selection"),
	}
	println!("{}", serde_json::to_string_pretty(&picker.selection())?);
	Ok(())
}

fn print_grid(picker: &Picker) {
	let calendar = picker.calendar();
	let header = picker
		.days()
		.iter()
		.map(|day| format!("{:>3} ", day.short))
		.collect::<String>();

	let window = picker.window();
	let months = i64::from(picker.config().visible_months());
	let in_view = |day: &CalendarDay| (0..months).contains(&window.month_offset(day.date));

	println!("{}", window.first_day().format("%B %Y"));
	println!("{}", header.trim_end());
	for week in calendar.dates.weeks() {
		let row = week
			.iter()
			.map(|day| grid_cell(day, in_view(day)))
			.collect::<String>();
		println!("{}", row.trim_end());
	}
}

fn grid_cell(day: &CalendarDay, in_view: bool) -> String {
	let selected = match day.marks {
		SelectionMarks::Single { is_selected } => is_selected,
		SelectionMarks::Range(marks) => marks.is_selected_range,
	};

	if selected {
		format!("{:>4}", format!("[{}]", day.date.day()))
	} else if day.is_today {
		format!("{:>3}*", day.date.day())
	} else if in_view {
		format!("{:>3} ", day.date.day())
	} else {
		"  . ".to_string()
	}
}

fn print_presets(now: NaiveDateTime, json: bool) -> Result<(), Box<dyn Error>> {
	let presets = DynamicValue::ALL
		.into_iter()
		.map(|value| Preset {
			token: value.token(),
			name: value.name(),
			date: value.resolve_date(now),
			range: value.resolve_range(now),
		})
		.collect::<Vec<_>>();

	if json {
		println!("{}", serde_json::to_string_pretty(&presets)?);
		return Ok(());
	}

	for preset in &presets {
		let date = preset
			.date
			.map(|date| TemporalValue::Date(date).to_string())
			.unwrap_or_else(|| "-".to_string());
		let range = preset
			.range
			.map(|range| TemporalValue::Range(range).to_string())
			.unwrap_or_else(|| "-".to_string());
		println!("{:<13} | {:<12} | {} | {}", preset.token, preset.name, date, range);
	}

	Ok(())
}
