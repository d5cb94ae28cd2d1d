use crate::filters::FilterConfig;
use crate::output::{NOTHING_SELECTED, OutputMode};
use crate::poller::{PollOutcome, PollTimer, Poller};
use crate::session::Session;
use crate::{cli, clipboard, tui, utils};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;
use std::{fs, io, thread};
use tracing::info;

// Resolves the root the same way every run mode sees it.
fn resolve_root(root: &Path) -> PathBuf {
    root.canonicalize().unwrap_or_else(|_| root.to_path_buf())
}

fn build_filters(cli_args: &cli::Cli) -> FilterConfig {
    FilterConfig::new(
        &cli_args.types,
        &cli_args.exclude_dirs,
        &cli_args.exclude_files,
    )
    .with_gitignore(cli_args.gitignore)
}

fn read_selection_text(source: &Path) -> Result<String> {
    if source == Path::new("-") {
        io::read_to_string(io::stdin()).context("failed to read hierarchy text from stdin")
    } else {
        fs::read_to_string(source)
            .with_context(|| format!("failed to read hierarchy text from {}", source.display()))
    }
}

// Prints the output, or copies it when asked to.
fn deliver_output(output: &str, copy: bool) -> Result<()> {
    if !copy {
        print!("{}", output);
        if !output.ends_with('\n') {
            println!();
        }
        return Ok(());
    }
    if output == NOTHING_SELECTED {
        println!("{} Clipboard not affected.", NOTHING_SELECTED);
        return Ok(());
    }
    clipboard::copy_text_to_clipboard(output)?;
    println!(
        "✅ Copied output (≈ {} tokens) to the clipboard.",
        utils::approx_tokens(output)
    );
    Ok(())
}

fn run_headless_mode(session: &mut Session, mode: OutputMode, copy: bool) -> Result<()> {
    let output = session.generate_output(mode);
    deliver_output(&output, copy)
}

// Renders once, then regenerates whenever a poll reports a change. Runs until killed.
fn run_watch_mode(session: &mut Session, cli_args: &cli::Cli) -> Result<()> {
    let mut timer = PollTimer::new(cli_args.poll_interval());
    run_headless_mode(session, cli_args.mode, cli_args.copy)?;
    timer.arm(Instant::now());
    info!(
        "watching {} every {:?}",
        session.root().display(),
        timer.interval()
    );

    loop {
        if let Some(wait) = timer.until_due(Instant::now()) {
            thread::sleep(wait);
        }
        if !timer.fire(Instant::now()) {
            continue;
        }
        match session.tick() {
            PollOutcome::Unchanged => {}
            outcome => {
                info!("{:?}, regenerating output", outcome);
                run_headless_mode(session, cli_args.mode, cli_args.copy)?;
            }
        }
        timer.arm(Instant::now());
    }
}

// Main orchestrator for the repostitch application logic.
pub fn run_repostitch(cli_args: cli::Cli) -> Result<()> {
    let root = resolve_root(&cli_args.root);
    let mut session = Session::open(&root, build_filters(&cli_args))
        .with_context(|| format!("cannot open {}", root.display()))?;

    if let Some(source) = &cli_args.select_from {
        let text = read_selection_text(source)?;
        let selected = session.import_selection(&text)?;
        info!("selected {} files from {}", selected, source.display());
    }

    if cli_args.watch {
        run_watch_mode(&mut session, &cli_args)
    } else if cli_args.headless {
        run_headless_mode(&mut session, cli_args.mode, cli_args.copy)
    } else {
        tui::run_tui(session, cli_args.mode, cli_args.poll_interval())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn filters_come_from_the_command_line() {
        let cli_args = cli::Cli::try_parse_from([
            "repostitch",
            "--types",
            "RS",
            "--exclude-files",
            "a.rs,b.rs",
            "--gitignore",
        ])
        .unwrap();
        let filters = build_filters(&cli_args);
        assert!(filters.extensions.contains(".rs"));
        assert_eq!(filters.excluded_files.len(), 2);
        assert!(filters.excluded_dirs.contains(".git"));
        assert!(filters.use_gitignore);
    }

    #[test]
    fn selection_text_is_read_from_files() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("sel.txt");
        fs::write(&path, "proj\n└── a.txt\n").unwrap();
        assert_eq!(read_selection_text(&path).unwrap(), "proj\n└── a.txt\n");
        assert!(read_selection_text(&tmp.path().join("missing")).is_err());
    }
}
