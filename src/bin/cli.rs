use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use jiff::{Zoned, civil::Date};
use timetable2cal::config::Config;
use timetable2cal::convert::Converter;
use timetable2cal::event::TIME_FORMAT;
use timetable2cal::export::write_events;
use timetable2cal::logging;
use timetable2cal::timetable::SessionKind;
use timetable2cal::workbook::{InputKind, read_input};

#[derive(Parser)]
struct Args {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Parser)]
enum Command {
    /// Convert a weekly schedule (CSV, XLSX or XLS) into a calendar-import CSV.
    Convert {
        input: PathBuf,
        /// Worksheet to read from a workbook; the first sheet by default.
        #[clap(long)]
        sheet: Option<String>,
        /// Defaults to stdout.
        #[clap(short, long)]
        output: Option<PathBuf>,
        /// Drop events before this date instead of before today.
        #[clap(long)]
        today: Option<Date>,
        /// Keep past events too.
        #[clap(long, conflicts_with = "today")]
        all: bool,
        #[clap(long)]
        no_bom: bool,
    },
    /// Print the period timetable.
    Timetable {
        #[clap(long, value_enum)]
        kind: Option<SessionKind>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load()?;
    logging::init(&config.log_level);

    match args.cmd {
        Command::Convert {
            input,
            sheet,
            output,
            today,
            all,
            no_bom,
        } => {
            let bytes =
                fs::read(&input).with_context(|| format!("failed to open {}", input.display()))?;
            let mut format = config.input.clone();
            if sheet.is_some() {
                format.sheet = sheet;
            }
            let kind = InputKind::detect(&input, &bytes);
            let records = read_input(&bytes, kind, &format)
                .with_context(|| format!("failed to read {}", input.display()))?;

            let converter = if all {
                Converter::all(config.expander())
            } else {
                let today = today.unwrap_or_else(|| Zoned::now().date());
                Converter::upcoming(config.expander(), today)
            };
            let conversion = converter.convert(records);

            let out: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(
                    File::create(path)
                        .with_context(|| format!("failed to create {}", path.display()))?,
                )),
                None => Box::new(io::stdout().lock()),
            };
            write_events(out, &conversion.events, config.bom && !no_bom)?;

            for failure in &conversion.failures {
                tracing::error!(row = failure.row, error = %failure.error, "row not converted");
            }
        }
        Command::Timetable { kind } => {
            let kinds = match kind {
                Some(kind) => vec![kind],
                None => vec![SessionKind::Lecture, SessionKind::Practice],
            };
            for kind in kinds {
                println!("{}", kind.label());
                for (period, slot) in (1..).zip(kind.slots()) {
                    println!(
                        "  {period:>2}  {}-{}",
                        slot.start.strftime(TIME_FORMAT),
                        slot.end.strftime(TIME_FORMAT)
                    );
                }
            }
        }
    }

    Ok(())
}
