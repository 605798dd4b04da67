//! `eonet completions` and `eonet man`.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::Shell;
use clap_mangen::Man;

use crate::Cli;

const BIN_NAME: &str = "eonet";

/// The CLI definition with subcommand display names filled in.
fn built_command() -> clap::Command {
    let mut cmd = Cli::command();
    cmd.build();
    cmd
}

/// Subcommands that get a page of their own.
fn page_topics(cmd: &clap::Command) -> Vec<String> {
    cmd.get_subcommands()
        .filter(|sub| !sub.is_hide_set() && sub.get_name() != "help")
        .map(|sub| sub.get_name().to_string())
        .collect()
}

fn page_file_name(topic: Option<&str>) -> String {
    match topic {
        Some(name) => format!("{BIN_NAME}-{name}.1"),
        None => format!("{BIN_NAME}.1"),
    }
}

fn write_completions(shell: Shell, out: &mut dyn Write) {
    clap_complete::generate(shell, &mut Cli::command(), BIN_NAME, out);
}

/// Render the page for one subcommand, or the main page when `topic` is `None`.
fn write_man_page(
    topic: Option<&str>,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let cmd = built_command();
    let man = match topic {
        None => Man::new(cmd),
        Some(name) => {
            let sub = cmd
                .find_subcommand(name)
                .ok_or_else(|| format!("Unknown command: {name}"))?
                .clone();
            Man::new(sub).title(format!("{BIN_NAME}-{name}"))
        }
    };
    man.render(out)?;
    Ok(())
}

/// Write `topic`'s page, or every page, into `dir`. Returns the pages written.
fn write_man_dir(
    dir: &Path,
    topic: Option<&str>,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let topics: Vec<Option<String>> = match topic {
        Some(name) => vec![Some(name.to_string())],
        None => std::iter::once(None)
            .chain(page_topics(&built_command()).into_iter().map(Some))
            .collect(),
    };

    std::fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(topics.len());
    for topic in &topics {
        let path = dir.join(page_file_name(topic.as_deref()));
        let mut file = File::create(&path)?;
        write_man_page(topic.as_deref(), &mut file)?;
        written.push(path);
    }
    Ok(written)
}

pub(crate) fn handle_completions(shell: Shell) {
    write_completions(shell, &mut io::stdout().lock());
}

pub(crate) fn handle_man(
    topic: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(dir) => {
            let written = write_man_dir(&dir, topic.as_deref())?;
            println!("Wrote {} man page(s) to {}", written.len(), dir.display());
        }
        None => write_man_page(topic.as_deref(), &mut io::stdout().lock())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(topic: Option<&str>) -> String {
        let mut out = Vec::new();
        write_man_page(topic, &mut out).expect("man rendering should succeed");
        String::from_utf8(out).expect("man output should be UTF-8")
    }

    fn title_line(page: &str) -> &str {
        page.lines()
            .find(|line| line.starts_with(".TH"))
            .expect("page should have a title")
    }

    #[test]
    fn zsh_completions_cover_load_flags() {
        let mut out = Vec::new();
        write_completions(Shell::Zsh, &mut out);
        let script = String::from_utf8(out).expect("completion output should be UTF-8");
        assert!(script.contains("eonet"));
        assert!(script.contains("load"));
        assert!(script.contains("--concurrency"));
        assert!(script.contains("--with-events"));
    }

    #[test]
    fn main_page_lists_subcommands() {
        let page = render(None);
        assert!(title_line(&page).to_lowercase().contains("eonet"));
        assert!(page.contains("categories"));
        assert!(page.contains("load"));
    }

    #[test]
    fn load_page_documents_its_options() {
        let page = render(Some("load"));
        let title = title_line(&page).to_lowercase();
        assert!(title.contains("eonet") && title.contains("load"));
        assert!(page.contains("concurrency"));
        assert!(page.contains("days"));
    }

    #[test]
    fn unknown_topic_is_an_error() {
        let mut out = Vec::new();
        let err = write_man_page(Some("volcanoes"), &mut out).unwrap_err();
        assert!(err.to_string().contains("volcanoes"));
        assert!(out.is_empty());
    }

    #[test]
    fn page_topics_skip_help() {
        let topics = page_topics(&built_command());
        assert_eq!(topics, vec!["categories", "load", "completions", "man"]);
    }

    #[test]
    fn man_dir_gets_one_page_per_command() {
        let dir = std::env::temp_dir().join(format!("eonet-man-{}", std::process::id()));

        let written = write_man_dir(&dir, None).expect("man pages should be written");
        let names: Vec<String> = written
            .iter()
            .filter_map(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            vec![
                "eonet.1",
                "eonet-categories.1",
                "eonet-load.1",
                "eonet-completions.1",
                "eonet-man.1",
            ]
        );
        assert!(written.iter().all(|p| p.metadata().map(|m| m.len() > 0).unwrap_or(false)));

        let single = write_man_dir(&dir.join("single"), Some("categories"))
            .expect("single page should be written");
        assert_eq!(single.len(), 1);

        std::fs::remove_dir_all(&dir).expect("test output directory should be removable");
    }
}
