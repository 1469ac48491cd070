use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gedcom_reader::{GedcomReader, ParseOptions, Record};

/// Validate a GEDCOM file and inspect its records.
#[derive(Debug, Parser)]
#[command(name = "gedcom-check", version)]
struct Args {
    /// Path to the GEDCOM file
    gedcom_file: PathBuf,

    /// Enable relaxed validation for older GEDCOM versions
    #[arg(long)]
    relaxed: bool,

    /// Only validate the file, do not list anything
    #[arg(long)]
    validate_only: bool,

    /// List root records with this tag (default: INDI)
    #[arg(long, value_name = "TAG", conflicts_with = "record")]
    tag: Option<String>,

    /// Dump the record with this XREF ID, e.g. @I1@
    #[arg(long, value_name = "XREF_ID")]
    record: Option<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let options = if args.relaxed {
        ParseOptions::relaxed()
    } else {
        ParseOptions::strict()
    };
    let path = args.gedcom_file.display();

    let reader = match GedcomReader::open(&args.gedcom_file, options) {
        Ok(reader) => reader,
        Err(e) => {
            if args.relaxed {
                eprintln!("✗ File '{}' is not a valid GEDCOM file (even in relaxed mode):", path);
            } else {
                eprintln!("✗ File '{}' is not a valid GEDCOM file:", path);
            }
            eprintln!("  Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let suffix = if args.relaxed { " (relaxed mode)" } else { "" };
    println!("✓ File '{}' is a valid GEDCOM {} file{}", path, reader.dialect(), suffix);
    println!("  - Encoding: {} (decoded as {})", reader.charset(), reader.codec());
    println!("  - {} individuals", reader.individuals().count());
    println!("  - {} families", reader.families().count());
    if !reader.recoveries().is_empty() {
        println!("  - {} lines skipped or repaired", reader.recoveries().len());
        for recovery in reader.recoveries() {
            println!("      line {}: {}", recovery.line, recovery.kind);
        }
    }

    if args.validate_only {
        return ExitCode::SUCCESS;
    }

    if let Some(xref) = &args.record {
        match reader.resolve(xref) {
            Some(record) => {
                println!("\n{}", "=".repeat(60));
                dump(record);
            }
            None => {
                eprintln!("No record found with ID: {}", xref);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    let tag = args.tag.as_deref().unwrap_or("INDI");
    let records: Vec<&Record> = reader.records_by_tag(tag).collect();
    if records.is_empty() {
        println!("\nNo {} records found in the file.", tag);
        return ExitCode::SUCCESS;
    }

    println!("\n{} records ({}):", tag, records.len());
    println!("{}", "-".repeat(60));
    for record in records {
        let label = record
            .child_value("NAME")
            .or_else(|| record.child_value("TITL"))
            .unwrap_or(record.value());
        println!("{:<12} {}", record.xref().unwrap_or("-"), label);
    }
    ExitCode::SUCCESS
}

/// Prints a record and its subtree, one indented line per record.
fn dump(record: &Record) {
    println!("{}", record);
    for child in record.descendants() {
        let indent = "  ".repeat((child.level() - record.level()) as usize);
        println!("{}{}", indent, child);
    }
}
