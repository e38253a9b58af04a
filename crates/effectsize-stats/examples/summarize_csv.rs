use std::env;
use std::path::PathBuf;

use effectsize_core::read_csv;
use effectsize_stats::{ReportEngine, ReportOptions, render_report};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let mut input: Option<PathBuf> = None;
    let mut group: Option<String> = None;
    let mut out_dir: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--group" => group = args.next(),
            "--out" => out_dir = args.next().map(PathBuf::from),
            _ => {
                if input.is_none() {
                    input = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let input = input.ok_or("missing input csv")?;
    let group = group.ok_or("missing --group column")?;

    let table = read_csv(&input)?;
    let mut options = ReportOptions::new(group);
    options.source = Some(input.display().to_string());
    let engine = ReportEngine::new(options);
    let report = engine.run(&table)?;

    match out_dir {
        Some(out_dir) => {
            let artifacts = engine.write_artifacts(&report, &out_dir)?;
            println!("report_path={}", artifacts.report_md.display());
        }
        None => println!("{}", render_report(&report, engine.options().max_rows)),
    }
    Ok(())
}
