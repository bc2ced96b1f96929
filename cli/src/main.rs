use std::error::Error;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use hwgen_fu::{CoprocessorMode, GeneratedUnit, GeneratorOptions};
use hwgen_hdl::{Dialect, ModuleOptions, ResetStyle};
use hwgen_json::Description;
use hwgen_rf::RfOptions;

#[cfg(feature = "trace")]
fn setup_tracing() -> Result<(), Box<dyn Error>> {
    use tracing_subscriber::prelude::*;

    let tree_layer = tracing_tree::HierarchicalLayer::new(2).with_targets(true);
    tracing_subscriber::registry()
        .with(tree_layer)
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .try_init()?;
    Ok(())
}

#[cfg(not(feature = "trace"))]
fn setup_tracing() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).try_init()?;
    Ok(())
}

#[derive(Default)]
struct Arguments {
    input: String,
    output: String,
    language: String,
    front_register: String,
    middle_register: String,
    back_register: String,
    ic_gate: String,
    dont_care_init: bool,
    sync_reset: bool,
    active_high_reset: bool,
    reset_everything: bool,
    coprocessor: String,
    dot: Option<String>,
}

fn parse_arguments() -> Arguments {
    let mut arguments = Arguments { language: "vhdl".to_owned(), coprocessor: "none".to_owned(), ..Arguments::default() };
    {
        use argparse::{ArgumentParser, Store, StoreOption, StoreTrue};

        let mut parser = ArgumentParser::new();
        parser.set_description("Generate function unit and register file sources from a JSON description.");
        parser.refer(&mut arguments.input).add_argument("DESCRIPTION", Store, "Description file").required();
        parser.refer(&mut arguments.output).add_option(&["-o", "--output"], Store, "Output directory").required();
        parser.refer(&mut arguments.language).add_option(&["-l", "--language"], Store, "vhdl or verilog");
        parser.refer(&mut arguments.front_register).add_option(
            &["--fu-front-register"],
            Store,
            "Units registered before their logic (comma separated, or 'all')",
        );
        parser.refer(&mut arguments.middle_register).add_option(
            &["--fu-middle-register"],
            Store,
            "Units registered on both sides of their logic",
        );
        parser.refer(&mut arguments.back_register).add_option(
            &["--fu-back-register"],
            Store,
            "Units registered after their logic",
        );
        parser.refer(&mut arguments.ic_gate).add_option(&["--fu-ic-gate"], Store, "Units with load gated inputs");
        parser.refer(&mut arguments.dont_care_init).add_option(
            &["--dont-care-init"],
            StoreTrue,
            "Initialize unused signals with don't care",
        );
        parser.refer(&mut arguments.sync_reset).add_option(&["--sync-reset"], StoreTrue, "Use synchronous reset");
        parser.refer(&mut arguments.active_high_reset).add_option(
            &["--active-high-reset"],
            StoreTrue,
            "Use the active high reset 'rst'",
        );
        parser.refer(&mut arguments.reset_everything).add_option(
            &["--reset-everything"],
            StoreTrue,
            "Reset every register",
        );
        parser.refer(&mut arguments.coprocessor).add_option(
            &["--coprocessor"],
            Store,
            "Co-processor wrapper: none, cvxif or rocc",
        );
        parser.refer(&mut arguments.dot).add_option(&["--dot"], StoreOption, "Write operation schedules to this file");
        parser.parse_args_or_exit();
    }
    arguments
}

fn list(value: &str) -> Vec<String> {
    value.split(',').map(str::trim).filter(|name| !name.is_empty()).map(str::to_owned).collect()
}

fn coprocessor_mode(value: &str) -> Result<CoprocessorMode, Box<dyn Error>> {
    match value.to_ascii_lowercase().as_str() {
        "none" => Ok(CoprocessorMode::None),
        "cvxif" => Ok(CoprocessorMode::Cvxif),
        "rocc" => Ok(CoprocessorMode::Rocc),
        _ => Err(format!("unknown co-processor interface {value:?}").into()),
    }
}

fn generator_options(arguments: &Arguments, search_path: PathBuf) -> Result<GeneratorOptions, Box<dyn Error>> {
    let dialect: Dialect = arguments.language.parse()?;
    let reset_style = if arguments.sync_reset { ResetStyle::Synchronous } else { ResetStyle::Asynchronous };
    Ok(GeneratorOptions {
        dialect,
        module: ModuleOptions {
            reset_style,
            active_low_reset: !arguments.active_high_reset,
            reset_everything: arguments.reset_everything,
        },
        front_registered: list(&arguments.front_register),
        middle_registered: list(&arguments.middle_register),
        back_registered: list(&arguments.back_register),
        ic_gate: list(&arguments.ic_gate),
        dont_care_init: arguments.dont_care_init,
        coprocessor: coprocessor_mode(&arguments.coprocessor)?,
        search_paths: vec![search_path],
        ..GeneratorOptions::default()
    })
}

/// Generates every listed unit, reporting failures without stopping. Returns whether all succeeded.
fn generate_all(
    description: &Description,
    options: &GeneratorOptions,
    output: &Path,
    units: &mut Vec<GeneratedUnit>,
) -> bool {
    let mut success = true;
    for name in &description.generate_fu {
        let implementation = description.implementation(name);
        let result = hwgen_fu::generate(options, &description.machine, &implementation)
            .and_then(|mut unit| unit.write_to(output).map(|path| (unit, path)));
        match result {
            Ok((unit, path)) => {
                tracing::info!(unit = %name, path = %path.display(), "function unit generated");
                units.push(unit);
            }
            Err(error) => {
                eprintln!("error: {error}");
                success = false;
            }
        }
    }

    let rf_options = RfOptions { dialect: options.dialect, module: options.module.clone(), timestamp: None };
    for name in &description.generate_rf {
        let Some(rf) = description.register_file(name) else { continue };
        match hwgen_rf::generate(&rf_options, rf).and_then(|mut rf| rf.write_to(output)) {
            Ok(path) => tracing::info!(rf = %name, path = %path.display(), "register file generated"),
            Err(error) => {
                eprintln!("error: cannot generate register file {name}: {error}");
                success = false;
            }
        }
    }
    success
}

fn write_schedules(path: &str, units: &[GeneratedUnit]) -> Result<(), Box<dyn Error>> {
    let mut writer = BufWriter::new(File::create(path)?);
    for unit in units {
        hwgen_graphviz::describe(&mut writer, unit)?;
    }
    writer.flush()?;
    Ok(())
}

fn run() -> Result<bool, Box<dyn Error>> {
    setup_tracing()?;
    let arguments = parse_arguments();
    let input = Path::new(&arguments.input);
    let search_path = input.parent().map(Path::to_path_buf).unwrap_or_default();
    let options = generator_options(&arguments, search_path)?;
    let description = hwgen_json::import(&mut File::open(input)?)?;

    let mut units = Vec::new();
    let success = generate_all(&description, &options, Path::new(&arguments.output), &mut units);
    if let Some(dot) = &arguments.dot {
        write_schedules(dot, &units)?;
    }
    Ok(success)
}

fn main() {
    match run() {
        Ok(true) => (),
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("error: {error}");
            std::process::exit(1)
        }
    }
}
