use anyhow::{Context, Result};
use clap::Parser;

use brlkeys::cli::{CliArgs, CliCommand};
use brlkeys::effects::Effect;
use brlkeys::keytable::{
    get_default_keytable_yaml, load_key_table, Argument, KeyNames, KeyTable, COMMANDS,
};
use brlkeys::script::{replay, Script, Step};
use brlkeys::session::WindowGeometry;
use brlkeys::{Engine, Preferences};

fn main() -> Result<()> {
    let args = CliArgs::parse();
    brlkeys::tracing::init(args.verbose, !args.no_log_file);

    let prefs = match &args.prefs {
        Some(path) => Preferences::load_from(path)
            .with_context(|| format!("loading preferences from {}", path.display()))?,
        None => Preferences::load(),
    };

    match &args.command {
        CliCommand::Replay { script, .. } => {
            let (columns, rows) = args.geometry().unwrap_or((40, 1));
            let table = load_key_table(args.table.as_deref()).context("loading key table")?;
            run_replay(script, table, prefs, WindowGeometry::new(columns, rows))
        }
        CliCommand::Check => {
            let table = load_key_table(args.table.as_deref()).context("loading key table")?;
            print_table_summary(&table);
            Ok(())
        }
        CliCommand::Commands => {
            for entry in COMMANDS {
                let argument = match entry.argument {
                    Argument::None => "",
                    Argument::Explicit => "+n",
                    _ => " (key)",
                };
                println!("{:<12} {}{}", entry.name, entry.description, argument);
            }
            Ok(())
        }
        CliCommand::DefaultTable => {
            print!("{}", get_default_keytable_yaml());
            Ok(())
        }
    }
}

fn run_replay(
    path: &std::path::Path,
    table: KeyTable,
    prefs: Preferences,
    geometry: WindowGeometry,
) -> Result<()> {
    let script = Script::load(path)?;
    let names = table.names().clone();
    let steps = script.steps(&names)?;

    let mut engine = Engine::new(prefs, Box::new(script.screen())).with_geometry(geometry);
    engine.set_key_table(table);

    for (index, record) in replay(&mut engine, &steps).iter().enumerate() {
        let effects: Vec<String> = record.effects.iter().map(describe_effect).collect();
        println!(
            "{:>3} {:<28} window {},{}  {}",
            index + 1,
            describe_step(&record.step, &names),
            record.position.0,
            record.position.1,
            effects.join(", ")
        );
    }
    Ok(())
}

fn describe_step(step: &Step, names: &KeyNames) -> String {
    match step {
        Step::Press(key) => format!("press {}", names.describe(*key)),
        Step::Release(key) => format!("release {}", names.describe(*key)),
        Step::Tap(key) => format!("tap {}", names.describe(*key)),
        Step::Wait(ms) => format!("wait {}ms", ms),
        Step::Command(command) => format!("command {}", command),
    }
}

fn describe_effect(effect: &Effect) -> String {
    match effect {
        Effect::Alert(alert) => format!("alert {}", alert),
        Effect::Speak(text) => format!("speak {:?}", text),
        Effect::RouteCursor { column, row } => format!("route {},{}", column, row),
        Effect::HostCommand(argv) => format!("run {}", argv.join(" ")),
        Effect::Redraw => "redraw".to_string(),
    }
}

fn print_table_summary(table: &KeyTable) {
    for (id, context) in table.contexts() {
        let kind = match (&context.title, table.is_temporary_context(id)) {
            (Some(title), _) => format!("persistent \"{}\"", title),
            (None, true) => "temporary".to_string(),
            (None, false) => "default".to_string(),
        };
        println!(
            "context {} {:<10} {}{}: {} bindings, {} hotkeys, {} mapped keys",
            id,
            context.name,
            kind,
            if context.isolated { ", isolated" } else { "" },
            context.bindings().len(),
            context.hotkeys().len(),
            context.mapped_keys().len()
        );
    }
}
