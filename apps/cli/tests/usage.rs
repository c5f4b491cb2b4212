use std::error::Error;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_prints_usage_and_succeeds() -> Result<(), Box<dyn Error>> {
    for flag in ["-h", "--help", "--Help"] {
        Command::cargo_bin("pdfspool")?
            .arg(flag)
            .assert()
            .success()
            .stderr(predicate::str::contains("Usage:").and(predicate::str::contains("--fast-fail")));
    }
    Ok(())
}

#[test]
fn help_wins_over_invalid_arguments() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("pdfspool")?
        .args(["-s", "sideways", "-p", "a99", "--help", "-d"])
        .assert()
        .code(0)
        .stderr(
            predicate::str::contains("Usage:").and(predicate::str::contains("Error:").not()),
        );
    Ok(())
}

#[test]
fn no_arguments_prints_short_hint() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("pdfspool")?
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("Missing arguments")
                .and(predicate::str::contains("Usage:").not()),
        );
    Ok(())
}

#[test]
fn missing_printer_prints_usage() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("pdfspool")?
        .args(["-f", "a.pdf", "-s", "fit"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("missing required option: printer")
                .and(predicate::str::contains("Usage:")),
        );
    Ok(())
}

#[test]
fn missing_files_prints_usage() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("pdfspool")?
        .args(["--printer=Office", "--scaling=fit", "--fast-fail"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("missing required option: file")
                .and(predicate::str::contains("Usage:")),
        );
    Ok(())
}

#[test]
fn invalid_scaling_names_the_token() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("pdfspool")?
        .args(["-f", "a.pdf", "-d", "Office", "-s", "stretch"])
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("invalid scaling mode 'stretch'")
                .and(predicate::str::contains("Usage:").not()),
        );
    Ok(())
}

#[test]
fn invalid_paper_size_names_the_token() -> Result<(), Box<dyn Error>> {
    Command::cargo_bin("pdfspool")?
        .args(["-f", "a.pdf", "-d", "Office", "-s", "fit", "--papersize", "quarto"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid paper size 'quarto'"));
    Ok(())
}
